//! Fixed names of the tatdylf project.

/// Final executable produced by the link step.
pub const PROGRAM_NAME: &str = "tatdylf.exe";

/// Translation units, in declaration order.
pub const SOURCES: [&str; 2] = ["tatdylf.cpp", "tatdylf_ui.cpp"];

/// Resource script compiled into the executable.
pub const RESOURCE_SCRIPT: &str = "tatdylf.rc";

/// System import libraries. Link order matters on the MSVC toolchain family.
pub const SYSTEM_LIBS: [&str; 4] = ["kernel32.lib", "ws2_32.lib", "user32.lib", "shell32.lib"];

/// Configuration file installed next to the executable. Lives in the project's parent directory.
pub const SIBLING_CONFIG: &str = "tatdylf.ini";

/// Source subtree of the project root.
pub const SRC_DIR: &str = "src";

/// Build-output subtree of the project root.
pub const BUILD_DIR: &str = "build";

/// Install destination, relative to the project's parent directory.
pub const INSTALL_DIR: &str = "bin";

/// Subdirectory of the build tree receiving the transformed executable.
pub const TRANSFORM_DIR: &str = "squab";

/// Build-graph definition handed to the engine with `-f`.
pub const DEFINITION_FILE: &str = "tatdylf.scons";

/// First line of a rendered definition; followed by the graph hash.
pub const DEFINITION_HEADER: &str = "# bld graph ";
