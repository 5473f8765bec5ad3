#![forbid(unsafe_code)]

fn main() -> std::process::ExitCode {
    millcert_cli::main_entry()
}
