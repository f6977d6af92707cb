use std::process::Command;

/// Convert a Command to a string that can be run in a shell (for debug
/// purposes).
///
/// Arguments starting with a dash are put on their own (escaped) line
/// together with the value that follows them, e.g. `--psm` and `6`.
pub fn command_to_string(cmd: &Command) -> String {
    let mut command_string = String::new();
    command_string.push_str(&cmd.get_program().to_string_lossy());

    for arg in cmd.get_args() {
        let arg_str = arg.to_string_lossy();
        command_string.push(' ');
        if arg_str.starts_with('-') {
            command_string.push_str("\\\n\t");
            command_string.push_str(&arg_str);
        } else {
            command_string.push_str(&format!("{:?}", arg_str));
        }
    }

    command_string
}
