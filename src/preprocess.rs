/// Drops blank lines and `;` comment lines, keeping every other line
/// verbatim and newline-terminated.
pub fn preprocess(script: &str) -> String {
    script
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with(';'))
        .fold(String::new(), |mut processed, line| {
            processed.push_str(line);
            processed.push('\n');
            processed
        })
}
