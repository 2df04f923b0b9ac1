fn main() -> std::process::ExitCode {
    mapq_cli_lib::run()
}
