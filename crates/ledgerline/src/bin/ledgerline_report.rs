//! ledgerline-report - Build account, yearly and statement reports.

fn main() -> std::process::ExitCode {
    ledgerline::cmd::report_cmd::main()
}
