//! System-wide constants, label keys, and default paths.

/// Application name used in CLI output.
pub const APP_NAME: &str = "atomic";

/// Default path of the container engine client binary.
pub const DEFAULT_DOCKER_PATH: &str = "/usr/bin/docker";

/// Program name that rendered command templates use for the engine client.
pub const DOCKER_PROGRAM: &str = "docker";

/// Command used when an image declares none.
pub const DEFAULT_COMMAND: &[&str] = &["/bin/sh"];

/// In-container script run by `install` when the image has no install label.
pub const DEFAULT_INSTALL_SCRIPT: &str = "/usr/bin/install.sh";

/// In-container script run by `uninstall` when the image has no uninstall label.
pub const DEFAULT_UNINSTALL_SCRIPT: &str = "/usr/bin/uninstall.sh";

/// Mount point of the host root filesystem inside SPC containers.
pub const DEFAULT_HOST_ROOT: &str = "/host";

/// Host-side update tool that `atomic host` passes arguments to.
pub const DEFAULT_HOST_TOOL: &str = "rpm-ostree";

/// Label holding the run command template.
pub const LABEL_RUN: &str = "io.projectatomic.atomic.run";
/// Label holding the install command template.
pub const LABEL_INSTALL: &str = "io.projectatomic.atomic.install";
/// Label holding the uninstall command template.
pub const LABEL_UNINSTALL: &str = "io.projectatomic.atomic.uninstall";
/// Label holding the graceful stop command.
pub const LABEL_STOP: &str = "io.projectatomic.atomic.stop";
/// Boolean label marking an image's container as persistent.
pub const LABEL_PERSISTENT: &str = "io.projectatomic.atomic.persistent";

/// Label holding the product name used by `version`.
pub const LABEL_NAME: &str = "Name";
/// Label holding the product version used by `version`.
pub const LABEL_VERSION: &str = "Version";
/// Label holding the product release used by `version`.
pub const LABEL_RELEASE: &str = "Release";

/// Environment variable carrying the logical container name.
pub const ENV_NAME: &str = "ATOMIC_NAME";
/// Environment variable carrying the source image reference.
pub const ENV_IMAGE: &str = "ATOMIC_IMAGE";
/// Environment variable set to `1` inside SPC containers.
pub const ENV_SPC: &str = "ATOMIC_SPC";
/// Environment variable pointing at the host root inside SPC containers.
pub const ENV_HOST: &str = "ATOMIC_HOST";
/// Configuration directory exported to spawned template commands.
pub const ENV_CONFDIR: &str = "ATOMIC_CONFDIR";
/// Log directory exported to spawned template commands.
pub const ENV_LOGDIR: &str = "ATOMIC_LOGDIR";
/// Data directory exported to spawned template commands.
pub const ENV_DATADIR: &str = "ATOMIC_DATADIR";

/// Placeholder for the container name in command templates.
pub const PLACEHOLDER_NAME: &str = "{name}";
/// Placeholder for the image reference in command templates.
pub const PLACEHOLDER_IMAGE: &str = "{image}";
/// Placeholder for the resolved image id in command templates.
pub const PLACEHOLDER_IMAGE_ID: &str = "{image_id}";

/// Values a boolean label accepts as true (compared case-insensitively).
pub const TRUTHY_LABEL_VALUES: &[&str] = &["1", "true", "yes"];
