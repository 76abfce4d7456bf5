//! Security and identity fields of a cloned container.

use specwright_spec::{DraftSpec, ResolvedContainerConfig};

/// Copies privilege, label, user, group and host-user settings from a
/// stored configuration into a draft. Label options are appended to the
/// ones already in the draft.
pub fn map_security_config(config: &ResolvedContainerConfig, draft: &mut DraftSpec) {
    draft.privileged = Some(config.privileged);
    draft.selinux_opts.extend(config.label_opts.iter().cloned());
    draft.user.clone_from(&config.user);
    draft.groups.clone_from(&config.groups);
    draft.host_users.clone_from(&config.host_users);
}
