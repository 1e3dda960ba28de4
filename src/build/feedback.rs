use colored::*;

/// Turns raw toolchain output into a short hint for the common failures.
pub struct FeedbackAnalyzer;

impl FeedbackAnalyzer {
    pub fn analyze(output: &str) -> Option<String> {
        // Missing entry point
        if output.contains("undefined reference to `main'")
            || output.contains("entry point must be defined")
            || output.contains("_main\", referenced from")
        {
            return Some(format!(
                "Your project is missing a {} function.\nAdd one, or pass {} if this is a library.",
                "main()".bold().yellow(),
                "--type dll".bold().green()
            ));
        }

        // Unresolved symbols
        if output.contains("LNK2019")
            || output.contains("undefined reference to")
            || output.contains("Undefined symbols")
        {
            return Some(format!(
                "It looks like a {} error.\nYou might be missing a library. Try {} or a {} table in qb.toml.",
                "Linker".bold().red(),
                "--pkg <name>".bold().green(),
                "[package.<name>]".bold().yellow()
            ));
        }

        // Missing header
        if (output.contains("fatal error: ") && output.contains("No such file or directory"))
            || output.contains("file not found")
            || output.contains("cannot open include file")
        {
            return Some(format!(
                "It looks like a {} error.\nYou might be missing an include path. Try {} or {}.",
                "Missing Header".bold().red(),
                "--include <dir>".bold().green(),
                "--pkg <name>".bold().green()
            ));
        }

        None
    }
}
