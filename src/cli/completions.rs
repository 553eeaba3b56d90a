//! shell completion generation for bash, zsh, and fish

use clap::{CommandFactory, ValueEnum};
use clap_complete::{generate, Shell};
use std::io::Write;

use super::commands::Cli;

/// supported shells for completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

impl CompletionShell {
    fn to_clap_shell(self) -> Shell {
        match self {
            Self::Bash => Shell::Bash,
            Self::Zsh => Shell::Zsh,
            Self::Fish => Shell::Fish,
        }
    }
}

/// generate completion script content for a shell
pub fn generate_completion(shell: CompletionShell) -> Vec<u8> {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    generate(shell.to_clap_shell(), &mut cmd, "showfor", &mut buf);
    buf
}

pub fn write_completion(shell: CompletionShell, out: &mut impl Write) -> std::io::Result<()> {
    out.write_all(&generate_completion(shell))
}
