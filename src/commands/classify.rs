//! `foreman classify` command.

use crate::router::ModelRouter;

/// Execute the `classify` command: print the routed task kind.
///
/// # Errors
///
/// Never fails; the signature matches the other command handlers.
pub fn run(text: &str) -> Result<(), String> {
    let kind = ModelRouter::classify(text);
    println!("{kind}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn classify_command_runs() {
        assert!(run("implement a widget").is_ok());
    }
}
