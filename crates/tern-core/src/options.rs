//! Sanitation of user-supplied `docker run` option strings.
//!
//! Options are passed through verbatim apart from two targeted edits: the
//! interactive-mode guard (stdin that is not a terminal cannot satisfy
//! `-i`/`--interactive`, so those tokens are removed) and user-identity
//! forwarding (`--user $(id -u):$(id -g)` is appended unless the user picked
//! an identity already). Tokenization is plain whitespace splitting; broken
//! option strings stay broken.

/// Result of sanitizing one option string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedOptions {
    pub tokens: Vec<String>,
    /// Debug traces describing each interactive-mode edit.
    pub traces: Vec<String>,
}

/// Applies the interactive-mode guard, then user-identity forwarding.
pub fn sanitize_run_options(raw: &str, stdin_is_tty: bool) -> SanitizedOptions {
    let mut tokens: Vec<String> = raw.split_whitespace().map(str::to_owned).collect();
    let mut traces = Vec::new();
    if !stdin_is_tty {
        drop_interactive(&mut tokens, &mut traces);
    }
    forward_user(&mut tokens);
    SanitizedOptions { tokens, traces }
}

fn drop_interactive(tokens: &mut Vec<String>, traces: &mut Vec<String>) {
    let mut index = 0;
    while index < tokens.len() {
        let token = tokens[index].clone();
        if token == "--interactive" {
            traces.push(drop_trace(&token, &tokens.join(" ")));
            tokens.remove(index);
            continue;
        }
        if is_short_cluster(&token) && token.contains('i') {
            let stripped: String = token.chars().filter(|c| *c != 'i').collect();
            if stripped == "-" {
                traces.push(drop_trace(&token, &tokens.join(" ")));
                tokens.remove(index);
                continue;
            }
            traces.push(drop_trace("i", &token));
            tokens[index] = stripped;
        }
        index += 1;
    }
}

fn drop_trace(token: &str, context: &str) -> String {
    format!("the input device is not TTY, dropping '{token}' from '{context}'")
}

fn is_short_cluster(token: &str) -> bool {
    let Some(letters) = token.strip_prefix('-') else {
        return false;
    };
    // Option values produced by splitting (e.g. "-u):$(id") are not flags.
    !letters.is_empty()
        && !letters.starts_with('-')
        && letters.chars().all(|c| c.is_ascii_alphabetic())
}

fn forward_user(tokens: &mut Vec<String>) {
    if tokens.iter().any(|token| token == "-u" || token == "--user") {
        return;
    }
    tokens.push("--user".to_string());
    tokens.push("$(id -u):$(id -g)".to_string());
}
