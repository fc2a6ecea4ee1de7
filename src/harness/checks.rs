//! Mechanical code checks for the validate phase.
//!
//! All checks are lightweight structural heuristics over the generated text.
//! They accept both Rust-flavored (`fn`) and Python-flavored (`def`) code,
//! since the builder is not constrained to one target language. None of them
//! run or fully parse the code; they only have to be deterministic and cheap.

use once_cell::sync::Lazy;
use regex::Regex;

use super::CheckOutcome;

/// Function signatures, Rust or Python flavored: params and optional return.
static FN_SIGNATURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:pub\s+)?(?:async\s+)?(?:fn|def)\s+\w+\s*\(([^)]*)\)\s*(->)?").unwrap()
});

/// Checks that any code was produced at all.
pub(crate) fn check_has_code(code: &str) -> CheckOutcome {
    if code.trim().is_empty() {
        CheckOutcome { name: "has_code".into(), passed: false, detail: "no code provided".into() }
    } else {
        CheckOutcome { name: "has_code".into(), passed: true, detail: "code present".into() }
    }
}

/// Checks structural well-formedness: balanced delimiters and terminated
/// strings.
pub(crate) fn check_syntax(code: &str) -> CheckOutcome {
    match scan_structure(code) {
        Ok(()) => CheckOutcome {
            name: "syntax".into(),
            passed: true,
            detail: "delimiters balanced, strings terminated".into(),
        },
        Err(problem) => CheckOutcome { name: "syntax".into(), passed: false, detail: problem },
    }
}

/// Checks that declared functions carry type annotations.
///
/// Mirrors the planning contract: every specification requires annotated
/// functions. Passes vacuously when no function items are present.
pub(crate) fn check_type_annotations(code: &str) -> CheckOutcome {
    let mut saw_function = false;
    for captures in FN_SIGNATURE.captures_iter(code) {
        saw_function = true;
        let params = captures.get(1).map_or("", |m| m.as_str());
        let has_return = captures.get(2).is_some();
        if has_return || params_annotated(params) {
            return CheckOutcome {
                name: "type_annotations".into(),
                passed: true,
                detail: "annotated function found".into(),
            };
        }
    }

    if saw_function {
        CheckOutcome {
            name: "type_annotations".into(),
            passed: false,
            detail: "no type annotations on declared functions".into(),
        }
    } else {
        CheckOutcome {
            name: "type_annotations".into(),
            passed: true,
            detail: "no functions to check".into(),
        }
    }
}

/// Checks that the code carries a docstring or doc comment.
///
/// Passes vacuously when no function items are present.
pub(crate) fn check_doc_comments(code: &str) -> CheckOutcome {
    if !FN_SIGNATURE.is_match(code) {
        return CheckOutcome {
            name: "docstring".into(),
            passed: true,
            detail: "no functions to check".into(),
        };
    }

    let documented = code.contains("///")
        || code.contains("//!")
        || code.contains("\"\"\"")
        || code.contains("'''");
    if documented {
        CheckOutcome {
            name: "docstring".into(),
            passed: true,
            detail: "doc comment or docstring found".into(),
        }
    } else {
        CheckOutcome {
            name: "docstring".into(),
            passed: false,
            detail: "no docstring or doc comment found".into(),
        }
    }
}

/// True when any comma-separated parameter other than `self`/`cls` carries a
/// `name: type` annotation.
fn params_annotated(params: &str) -> bool {
    params.split(',').map(str::trim).any(|p| {
        let name = p.split(':').next().unwrap_or("").trim().trim_start_matches('&');
        !matches!(name, "self" | "cls" | "&self" | "&mut self") && p.contains(':')
    })
}

/// Scans for unbalanced brackets and unterminated double-quoted strings.
///
/// Hash and slash-slash comments are skipped; triple-double-quoted strings
/// may span lines, plain double-quoted strings must close on their line.
/// Single quotes are ignored entirely (Rust lifetimes, prose apostrophes).
pub(crate) fn scan_structure(code: &str) -> Result<(), String> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut in_triple = false;

    for (line_no, line) in code.lines().enumerate() {
        let bytes: Vec<char> = line.chars().collect();
        let mut i = 0;
        let mut in_string = false;

        while i < bytes.len() {
            let c = bytes[i];
            let triple_quote = c == '"' && bytes.get(i + 1) == Some(&'"') && bytes.get(i + 2) == Some(&'"');

            if in_triple {
                if triple_quote {
                    in_triple = false;
                    i += 3;
                    continue;
                }
                i += 1;
                continue;
            }

            if in_string {
                if c == '\\' {
                    i += 2;
                    continue;
                }
                if c == '"' {
                    in_string = false;
                }
                i += 1;
                continue;
            }

            match c {
                '"' if triple_quote => {
                    in_triple = true;
                    i += 3;
                    continue;
                }
                '"' => in_string = true,
                '#' => break,
                '/' if bytes.get(i + 1) == Some(&'/') => break,
                '(' | '[' | '{' => stack.push((c, line_no + 1)),
                ')' | ']' | '}' => {
                    let expected = match c {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    match stack.pop() {
                        Some((open, _)) if open == expected => {}
                        _ => {
                            return Err(format!(
                                "unmatched '{c}' on line {}",
                                line_no + 1
                            ))
                        }
                    }
                }
                _ => {}
            }
            i += 1;
        }

        if in_string {
            return Err(format!("unterminated string on line {}", line_no + 1));
        }
    }

    if in_triple {
        return Err("unterminated triple-quoted string".into());
    }
    if let Some((open, line)) = stack.pop() {
        return Err(format!("unclosed '{open}' opened on line {line}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_code_passes_syntax() {
        let code = "fn add(a: u32, b: u32) -> u32 {\n    a + b\n}\n";
        assert!(check_syntax(code).passed);
    }

    #[test]
    fn broken_def_fails_syntax() {
        // The classic malformed signature: `def f(:` leaves '(' unclosed.
        let outcome = check_syntax("def f(:\n    pass\n");
        assert!(!outcome.passed);
        assert!(outcome.detail.contains("unclosed '('"));
    }

    #[test]
    fn unmatched_closer_fails_syntax() {
        let outcome = check_syntax("fn f() { })\n");
        assert!(!outcome.passed);
    }

    #[test]
    fn unterminated_string_fails_syntax() {
        let outcome = check_syntax("let s = \"oops;\n");
        assert!(!outcome.passed);
        assert!(outcome.detail.contains("unterminated string"));
    }

    #[test]
    fn docstring_brackets_do_not_confuse_scanner() {
        let code = "def f(x: int) -> int:\n    \"\"\"Maps ( to ).\"\"\"\n    return x\n";
        assert!(check_syntax(code).passed);
    }

    #[test]
    fn comments_are_skipped() {
        let code = "// an ( unbalanced comment\n# another ( one\nfn f() -> u32 { 1 }\n";
        assert!(check_syntax(code).passed);
    }

    #[test]
    fn annotated_python_function_passes() {
        let code = "def greet(name: str) -> str:\n    return f\"hi {name}\"\n";
        assert!(check_type_annotations(code).passed);
    }

    #[test]
    fn unannotated_function_fails() {
        let code = "def greet(name):\n    return name\n";
        assert!(!check_type_annotations(code).passed);
    }

    #[test]
    fn self_only_params_do_not_count_as_annotations() {
        let code = "def method(self):\n    pass\n";
        assert!(!check_type_annotations(code).passed);
    }

    #[test]
    fn no_functions_passes_annotations_vacuously() {
        assert!(check_type_annotations("const X: u32 = 1;").passed);
    }

    #[test]
    fn rust_doc_comment_satisfies_docstring_check() {
        let code = "/// Adds numbers.\nfn add(a: u32, b: u32) -> u32 { a + b }\n";
        assert!(check_doc_comments(code).passed);
    }

    #[test]
    fn python_docstring_satisfies_docstring_check() {
        let code = "def f() -> None:\n    \"\"\"Does nothing.\"\"\"\n";
        assert!(check_doc_comments(code).passed);
    }

    #[test]
    fn undocumented_function_fails_docstring_check() {
        let code = "fn add(a: u32, b: u32) -> u32 { a + b }\n";
        assert!(!check_doc_comments(code).passed);
    }

    #[test]
    fn empty_code_fails_has_code() {
        assert!(!check_has_code("   \n").passed);
        assert!(check_has_code("fn f() {}").passed);
    }
}
