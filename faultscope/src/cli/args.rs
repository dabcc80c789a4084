//! CLI argument definitions

use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(
    name = "faultscope",
    about = "Install the fatal-signal handler and deliberately crash",
    after_help = "\
EXAMPLES:
    faultscope --fault segv                        Segfault with a full report
    faultscope --fault fpe --message 'report me'   Include a user-facing message
    faultscope --dry-run                           Install, check, exit cleanly"
)]
pub struct Args {
    /// Fault to trigger once the handler is installed
    #[arg(long, value_enum, default_value = "segv")]
    pub fault: FaultKind,

    /// User-facing message included in the crash report
    #[arg(long)]
    pub message: Option<String>,

    /// Install the handler, run the pre-install checks, then disable and
    /// exit without crashing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FaultKind {
    /// Invalid memory access (SIGSEGV)
    Segv,
    /// Arithmetic fault (SIGFPE)
    Fpe,
    /// Illegal instruction (SIGILL)
    Ill,
}
