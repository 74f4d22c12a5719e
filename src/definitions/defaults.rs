//! Built-in starter definitions.

/// Starter artifact definitions written by `init-definitions` and usable as
/// sample input for collection runs.
pub const STARTER_DEFINITIONS: &str = r#"name: UnixPasswdFile
doc: Local user account database.
labels: [Authentication, System]
supported_os: [Linux, Darwin]
sources:
  - type: file
    attributes:
      paths: ["/etc/passwd"]
---
name: UnixHostsFile
doc: Static hostname resolution table.
labels: [Network, "Configuration Files"]
supported_os: [Linux, Darwin]
sources:
  - type: file
    attributes:
      paths: ["/etc/hosts"]
---
name: WindowsHostsFile
doc: Static hostname resolution table.
labels: [Network, "Configuration Files"]
supported_os: [Windows]
sources:
  - type: file
    attributes:
      paths: ["C:\\Windows\\System32\\drivers\\etc\\hosts"]
      separator: "\\"
---
name: HostnameResolution
doc: Hostname resolution artifacts for every platform, grouped.
labels: [Network]
sources:
  - type: artifact-group
    attributes:
      names: [UnixHostsFile, WindowsHostsFile]
"#;
