//! Text scraping of `wg` output and tunnel file paths.

/// stderr fragment printed by a shell when the tool is absent
pub const COMMAND_NOT_FOUND: &str = "command not found";

/// stderr fragment printed by `wg show <dev>` for an unknown device
pub const NO_SUCH_DEVICE: &str = "No such device";

/// Device name from `wg show` output (`interface: wg0` on the first line).
pub fn device_from_show(stdout: &str) -> Option<String> {
    let first = stdout.split('\n').next().unwrap_or_default();
    let name: String = first
        .split(' ')
        .nth(1)
        .unwrap_or_default()
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .collect();
    (!name.is_empty()).then_some(name)
}

/// Device name from a failed `wg show`: the last word before the first colon,
/// e.g. `Unable to access interface wg0: Permission denied`.
pub fn device_from_error(stderr: &str) -> Option<String> {
    let head = stderr.split(':').next().unwrap_or_default();
    let name = head.split(' ').last().unwrap_or_default();
    (!name.is_empty()).then(|| name.to_string())
}

/// Whether `wg show <dev>` printed an interface block
pub fn reports_interface(stdout: &str) -> bool {
    stdout.contains("interface: ")
}

/// First device listed by `wg show interfaces`
pub fn first_interface(stdout: &str) -> Option<String> {
    stdout.split_whitespace().next().map(String::from)
}

/// Tunnel name for a config path: the file name without its last extension.
///
/// Both `/` and `\` separate directories regardless of the host platform, so
/// Windows paths handed over from elsewhere resolve the same way.
pub fn tunnel_name(path: &str) -> &str {
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file.rfind('.') {
        Some(dot) if dot > 0 => &file[..dot],
        _ => file,
    }
}
