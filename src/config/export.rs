//! Rendering of resolved variables as shell `export` statements.

use std::io::{self, Write};

use super::VariableStore;

/// Renders one `export NAME="VALUE"` line per variable, ordered by name.
///
/// `"`, `\`, `$` and `` ` `` are backslash-escaped so the output can be
/// sourced by a POSIX shell without further expansion.
pub fn export_lines(store: &VariableStore) -> impl Iterator<Item = String> + '_ {
    store
        .snapshot()
        .iter()
        .map(|(name, value)| format!("export {name}=\"{}\"", escape(value)))
}

/// Writes [`export_lines`] to `out`, newline-terminated.
pub fn write_exports<W: Write>(store: &VariableStore, mut out: W) -> io::Result<()> {
    for line in export_lines(store) {
        writeln!(out, "{line}")?;
    }
    out.flush()
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '"' | '\\' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_variable() {
        let mut store = VariableStore::new();
        store.put("A", "1");
        let lines: Vec<String> = export_lines(&store).collect();
        assert_eq!(lines, ["export A=\"1\""]);
    }

    #[test]
    fn test_sorted_output() {
        let mut store = VariableStore::new();
        store.merge([("B", "2"), ("A", "1")]);

        let mut out = Vec::new();
        write_exports(&store, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "export A=\"1\"\nexport B=\"2\"\n");
    }

    #[test]
    fn test_shell_metacharacters_escaped() {
        let mut store = VariableStore::new();
        store.put("MSG", r#"say "hi" to $USER `now` \o/"#);
        let lines: Vec<String> = export_lines(&store).collect();
        assert_eq!(
            lines,
            [r#"export MSG="say \"hi\" to \$USER \`now\` \\o/""#]
        );
    }

    #[test]
    fn test_empty_store_writes_nothing() {
        let mut out = Vec::new();
        write_exports(&VariableStore::new(), &mut out).unwrap();
        assert!(out.is_empty());
    }
}
