use std::process::ExitCode;

fn main() -> ExitCode {
    mini_shell::lib_main()
}
