// src/constants.rs

/// Setting key: the Perforce user the CI job authenticates as.
pub const KEY_USER: &str = "user";

/// Setting key: the client workspace the CI job syncs and queries through.
pub const KEY_CLIENT: &str = "client";

/// Setting key: the server address, `host:port`.
pub const KEY_PORT: &str = "port";

/// Setting key: the stored password. Obfuscated on disk, plaintext in memory.
pub const KEY_PASSWORD: &str = "password";

/// Setting key: the search path handed to the child process as `PATH`.
pub const KEY_PATH: &str = "path";

/// Setting key: location of the command-line client executable.
pub const KEY_EXECUTABLE: &str = "executable";

/// Setting key: the system drive (Windows only).
pub const KEY_SYSTEM_DRIVE: &str = "system_drive";

/// Setting key: the system root (Windows only).
pub const KEY_SYSTEM_ROOT: &str = "system_root";

/// Setting key: server timeout threshold, in seconds. Stored for callers;
/// the process executor itself never applies it.
pub const KEY_SERVER_TIMEOUT: &str = "server_timeout";

/// Setting key: an auth ticket usable in place of the plaintext password.
pub const KEY_TICKET: &str = "ticket";

pub const DEFAULT_PORT: &str = "localhost:1666";
pub const DEFAULT_EXECUTABLE: &str = "p4";
pub const DEFAULT_SYSTEM_DRIVE: &str = "C:";
pub const DEFAULT_SYSTEM_ROOT: &str = "C:\\WINDOWS";
pub const DEFAULT_PATHEXT: &str = ".COM;.EXE;.BAT;.CMD";

/// Environment variable names the executor environment is assembled under.
pub const ENV_USER: &str = "P4USER";
pub const ENV_CLIENT: &str = "P4CLIENT";
pub const ENV_PORT: &str = "P4PORT";
pub const ENV_PASSWORD: &str = "P4PASSWD";
pub const ENV_PATH: &str = "PATH";
pub const ENV_SYSTEM_DRIVE: &str = "SystemDrive";
pub const ENV_SYSTEM_ROOT: &str = "SystemRoot";
pub const ENV_PATHEXT: &str = "PATHEXT";

/// Marker prefixing every obfuscated credential token.
pub const CREDENTIAL_MARKER: &str = "enc:";

/// Literal prefix identifying a server-side path root in a view mapping.
pub const DEPOT_ROOT: &str = "//";

/// Prefix on a view line's depot column excluding that pattern from the
/// client's visible scope.
pub const EXCLUSION: &str = "-";
