//! Environment resolution.
//!
//! The container environment is assembled by a chain of pure stages, each
//! taking and returning an [`EnvMap`]. Precedence, lowest first:
//!
//! 1. baseline (`PATH`, `container`)
//! 2. daemon layer: host or proxy variables the daemon or the caller asks
//!    for, then the daemon's default variables
//! 3. image environment
//! 4. `TERM` fallback for terminal sessions
//! 5. merge directives, applied in order
//! 6. per-key unset, then 7. unset-all
//! 8. host pass-through the caller explicitly requested
//! 9. the caller's explicit variables

use std::collections::BTreeMap;

use specwright_common::config::DaemonConfig;
use specwright_common::constants::{APP_NAME, DEFAULT_PATH, DEFAULT_TERM};
use specwright_common::error::{Result, SpecError};
use specwright_image::store::ImageData;
use specwright_runtime::Runtime;
use specwright_runtime::host::HostEnv;
use specwright_spec::DraftSpec;

use crate::expand;

/// An environment: variable name to value.
pub type EnvMap = BTreeMap<String, String>;

/// Returns the variables every container starts with.
#[must_use]
pub fn baseline() -> EnvMap {
    EnvMap::from([
        ("PATH".to_string(), DEFAULT_PATH.to_string()),
        ("container".to_string(), APP_NAME.to_string()),
    ])
}

/// Returns `base` with every variable of `layer` written over it.
#[must_use]
pub fn overlay(mut base: EnvMap, layer: &EnvMap) -> EnvMap {
    base.extend(layer.iter().map(|(k, v)| (k.clone(), v.clone())));
    base
}

/// Sets `TERM` for terminal sessions that do not define it.
#[must_use]
pub fn with_terminal_default(mut env: EnvMap, terminal: bool) -> EnvMap {
    if terminal {
        let _ = env
            .entry("TERM".to_string())
            .or_insert_with(|| DEFAULT_TERM.to_string());
    }
    env
}

/// Applies `KEY=expression` merge directives in order.
///
/// Each directive is expanded against the environment left by the previous
/// ones, then split on its first `=`. An unset variable expands to the
/// empty string.
///
/// # Errors
///
/// Returns [`SpecError::Validation`] if a directive cannot be expanded or
/// has no `=`.
pub fn apply_merges(env: EnvMap, merges: &[String]) -> Result<EnvMap> {
    let mut merged = env;
    for directive in merges {
        let word = expand::expand(directive, &merged).map_err(|e| {
            SpecError::validation(format!("unable to process merge directive {directive:?}: {e}"))
        })?;
        let Some((key, value)) = word.split_once('=') else {
            return Err(SpecError::validation(format!(
                "missing `=` in merge directive {directive:?}"
            )));
        };
        tracing::debug!(key, "environment merge applied");
        let _ = merged.insert(key.to_string(), value.to_string());
    }
    Ok(merged)
}

/// Removes the named variables.
#[must_use]
pub fn unset_keys(mut env: EnvMap, keys: &[String]) -> EnvMap {
    for key in keys {
        let _ = env.remove(key);
    }
    env
}

/// Drops the whole environment when `all` is set.
#[must_use]
pub fn unset_all(env: EnvMap, all: bool) -> EnvMap {
    if all { EnvMap::new() } else { env }
}

/// Copies variables from the host.
///
/// With `env_host` the full host environment overrides `env`; otherwise,
/// with `http_proxy`, only the host's values of `proxy_names` do.
#[must_use]
pub fn host_passthrough(
    env: EnvMap,
    host: &dyn HostEnv,
    env_host: bool,
    http_proxy: bool,
    proxy_names: &[String],
) -> EnvMap {
    if env_host {
        return overlay(env, &host.vars());
    }
    if !http_proxy {
        return env;
    }
    let proxies: EnvMap = proxy_names
        .iter()
        .filter_map(|name| host.var(name).map(|value| (name.clone(), value)))
        .collect();
    overlay(env, &proxies)
}

/// Builds the daemon layer: host variables selected by the daemon's or the
/// caller's pass-through flags, overridden by the daemon's default
/// variables.
///
/// # Errors
///
/// Returns [`SpecError::Config`] for malformed daemon defaults.
pub fn daemon_layer(
    config: &DaemonConfig,
    host: &dyn HostEnv,
    env_host: bool,
    http_proxy: bool,
) -> Result<EnvMap> {
    let passed = host_passthrough(
        EnvMap::new(),
        host,
        config.env_host || env_host,
        config.http_proxy || http_proxy,
        &config.proxy_env,
    );
    Ok(overlay(passed, &config.default_env()?))
}

/// Resolves the final environment of a draft.
///
/// Host variables reach the final stage only when the draft asks for them;
/// daemon-driven pass-through stays in the daemon layer, below the image.
///
/// `image` is the inspect data of the draft's image, if it has one.
///
/// # Errors
///
/// Returns [`SpecError::Validation`] for malformed image entries or merge
/// directives, and [`SpecError::Config`] for malformed daemon defaults.
pub fn resolve_env(runtime: &Runtime, draft: &DraftSpec, image: Option<&ImageData>) -> Result<EnvMap> {
    let config = runtime.config();
    let env_host = draft.env_host.unwrap_or(false);
    let http_proxy = draft.http_proxy.unwrap_or(false);
    let mut env = overlay(
        baseline(),
        &daemon_layer(config, runtime.host_env(), env_host, http_proxy)?,
    );
    if let Some(image) = image {
        env = overlay(env, &image.env_map()?);
    }
    env = with_terminal_default(env, draft.terminal.unwrap_or(false));
    env = apply_merges(env, &draft.env_merge)?;
    env = unset_keys(env, &draft.unset_env);
    env = unset_all(env, draft.unset_env_all.unwrap_or(false));
    env = host_passthrough(env, runtime.host_env(), env_host, http_proxy, &config.proxy_env);
    Ok(overlay(env, &draft.env))
}
