//! Risk classification of shell command strings.
//!
//! [`classify`] is a pure function: it reads the command text and never runs
//! anything. It is conservative. Whatever it cannot read with confidence is
//! treated as [`RiskCategory::FileAltering`].
//!
//! # Example
//!
//! ```rust
//! use chatty_core::{classify, RiskCategory};
//!
//! assert_eq!(classify("ls -la"), RiskCategory::Safe);
//! assert_eq!(classify("touch notes.txt"), RiskCategory::FileCreating);
//! assert_eq!(classify("rm -rf build/"), RiskCategory::FileAltering);
//! assert_eq!(classify("echo hi > out.txt"), RiskCategory::FileAltering);
//! ```

mod lexer;
mod programs;

use serde::{Deserialize, Serialize};

use programs::Resolved;

/// Nesting limit for substitutions and `sh -c` scripts.
const MAX_DEPTH: usize = 8;

/// How much damage a command can do to existing files.
///
/// Variants are ordered by severity, so the risk of a compound command is
/// the [`Ord::max`] over its parts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    /// Read-only, informational or process-only.
    Safe,
    /// Only creates new paths.
    FileCreating,
    /// May modify or remove pre-existing files.
    FileAltering,
}

impl RiskCategory {
    pub fn is_safe(&self) -> bool {
        matches!(self, RiskCategory::Safe)
    }

    pub fn is_creating(&self) -> bool {
        matches!(self, RiskCategory::FileCreating)
    }

    pub fn is_altering(&self) -> bool {
        matches!(self, RiskCategory::FileAltering)
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskCategory::Safe => write!(f, "safe"),
            RiskCategory::FileCreating => write!(f, "file-creating"),
            RiskCategory::FileAltering => write!(f, "file-altering"),
        }
    }
}

/// Classify a shell command string.
///
/// Never fails. An empty command is unclassifiable and reported as
/// [`RiskCategory::FileAltering`].
pub fn classify(command: &str) -> RiskCategory {
    if command.trim().is_empty() {
        return RiskCategory::FileAltering;
    }
    classify_at(command, 0)
}

fn classify_at(command: &str, depth: usize) -> RiskCategory {
    if depth > MAX_DEPTH {
        return RiskCategory::FileAltering;
    }

    let scan = lexer::scan(command);
    if scan.malformed || !scan.write_targets.is_empty() {
        return RiskCategory::FileAltering;
    }

    let mut risk = RiskCategory::Safe;
    for inner in &scan.substitutions {
        risk = risk.max(classify_at(inner, depth + 1));
        if risk.is_altering() {
            return risk;
        }
    }

    for segment in &scan.segments {
        let Some(words) = shlex::split(segment) else {
            return RiskCategory::FileAltering;
        };
        let segment_risk = match programs::resolve(&words) {
            Resolved::Nothing => RiskCategory::Safe,
            Resolved::Command { program, args } => programs::command_risk(&program, &args),
            Resolved::Script(script) => classify_at(&script, depth + 1),
            Resolved::Opaque => RiskCategory::FileAltering,
        };
        risk = risk.max(segment_risk);
        if risk.is_altering() {
            return risk;
        }
    }

    risk
}

/// Paths a command names as its output, in command order.
///
/// Used after a file-creating command ran, to name what it produced.
/// Relative paths are returned as written.
pub(crate) fn creation_targets(command: &str) -> Vec<String> {
    let mut targets = Vec::new();
    collect_targets(command, 0, &mut targets);
    targets
}

/// Whether a command prints the paths it creates on stdout, as `mktemp`
/// does.
pub(crate) fn prints_created_paths(command: &str) -> bool {
    prints_at(command, 0)
}

fn prints_at(command: &str, depth: usize) -> bool {
    if depth > MAX_DEPTH {
        return false;
    }
    lexer::scan(command).segments.iter().any(|segment| {
        match shlex::split(segment).map(|words| programs::resolve(&words)) {
            Some(Resolved::Command { program, .. }) => programs::prints_created_path(&program),
            Some(Resolved::Script(script)) => prints_at(&script, depth + 1),
            _ => false,
        }
    })
}

fn collect_targets(command: &str, depth: usize, targets: &mut Vec<String>) {
    if depth > MAX_DEPTH {
        return;
    }

    let scan = lexer::scan(command);
    for segment in &scan.segments {
        let Some(words) = shlex::split(segment) else {
            continue;
        };
        match programs::resolve(&words) {
            Resolved::Command { program, args } => {
                for target in programs::creation_targets(&program, &args) {
                    if !targets.contains(&target) {
                        targets.push(target);
                    }
                }
            }
            Resolved::Script(script) => collect_targets(&script, depth + 1, targets),
            Resolved::Nothing | Resolved::Opaque => {}
        }
    }
    for target in scan.write_targets {
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_all(commands: &[&str], expected: RiskCategory) {
        for command in commands {
            assert_eq!(classify(command), expected, "classifying {:?}", command);
        }
    }

    // ===== Ordering =====

    #[test]
    fn test_categories_ordered_by_severity() {
        assert!(RiskCategory::Safe < RiskCategory::FileCreating);
        assert!(RiskCategory::FileCreating < RiskCategory::FileAltering);
        assert_eq!(
            RiskCategory::Safe.max(RiskCategory::FileCreating),
            RiskCategory::FileCreating
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(RiskCategory::FileAltering.to_string(), "file-altering");
        assert_eq!(RiskCategory::Safe.to_string(), "safe");
    }

    // ===== Program tables =====

    #[test]
    fn test_read_only_commands_are_safe() {
        assert_all(
            &[
                "ls -la",
                "cat README.md",
                "echo hello world",
                "grep -rn TODO src/",
                "pwd",
                "ps aux",
                "git status",
                "git log --oneline -5",
                "find . -name '*.rs'",
                "cd src",
                "export FOO=bar",
                "FOO=bar",
                "/bin/ls /tmp",
                "sed 's/a/b/' file.txt",
                "curl -s https://example.com",
            ],
            RiskCategory::Safe,
        );
    }

    #[test]
    fn test_creating_commands() {
        assert_all(
            &[
                "touch notes.txt",
                "mkdir -p build/out",
                "mktemp",
                "mkfifo pipe",
                "ln -s target link",
                "cp -n a.txt b.txt",
                "git clone https://github.com/rust-lang/rust.git",
                "git init",
                "wget https://example.com/file.tar.gz",
            ],
            RiskCategory::FileCreating,
        );
    }

    #[test]
    fn test_altering_commands() {
        assert_all(
            &[
                "rm -rf build/",
                "rmdir empty",
                "mv a b",
                "cp a b",
                "chmod +x run.sh",
                "chown root file",
                "truncate -s 0 log",
                "shred secret",
                "dd if=/dev/zero of=disk.img",
                "tee out.txt",
                "unlink x",
                "apt-get install jq",
                "sed -i 's/a/b/' file.txt",
                "perl -pi -e 's/a/b/' file.txt",
                "find . -name '*.o' -delete",
                "find . -exec rm {} \\;",
                "sort -o sorted.txt input.txt",
                "curl -o page.html https://example.com",
                "tar -xzf archive.tar.gz",
                "unzip archive.zip",
                "awk '{ print > \"out\" }' input",
                "git reset --hard",
                "ln -sf target link",
                "some-unknown-tool --flag",
            ],
            RiskCategory::FileAltering,
        );
    }

    // ===== Compound commands =====

    #[test]
    fn test_compound_takes_maximum() {
        assert_eq!(classify("ls && touch a"), RiskCategory::FileCreating);
        assert_eq!(classify("ls; rm a"), RiskCategory::FileAltering);
        assert_eq!(classify("cat a | grep b | wc -l"), RiskCategory::Safe);
        assert_eq!(classify("mkdir x || rm -r x"), RiskCategory::FileAltering);
    }

    #[test]
    fn test_quoted_operators_do_not_split() {
        assert_eq!(classify("echo 'rm -rf /; ls'"), RiskCategory::Safe);
        assert_eq!(classify("grep \"a && rm b\" file"), RiskCategory::Safe);
    }

    // ===== Redirections =====

    #[test]
    fn test_output_redirection_alters() {
        assert_all(
            &[
                "echo hi > out.txt",
                "echo hi >> log.txt",
                "ls 2>errors.log",
                "make &> build.log",
                "echo x >| forced.txt",
            ],
            RiskCategory::FileAltering,
        );
    }

    #[test]
    fn test_harmless_redirections_are_ignored() {
        assert_all(
            &[
                "grep foo file > /dev/null",
                "ls 2>&1",
                "ls 2>/dev/null | wc -l",
                "wc -l < input.txt",
                "cat <<EOF",
            ],
            RiskCategory::Safe,
        );
    }

    // ===== Substitutions and wrappers =====

    #[test]
    fn test_substitutions_are_classified() {
        assert_eq!(classify("echo $(date)"), RiskCategory::Safe);
        assert_eq!(classify("echo $(rm -rf x)"), RiskCategory::FileAltering);
        assert_eq!(classify("echo `touch a`"), RiskCategory::FileCreating);
        assert_eq!(classify("diff <(ls a) <(ls b)"), RiskCategory::Safe);
        assert_eq!(classify("echo \"$(rm x)\""), RiskCategory::FileAltering);
    }

    #[test]
    fn test_prints_created_paths() {
        assert!(prints_created_paths("mktemp"));
        assert!(prints_created_paths("mktemp -d && ls"));
        assert!(prints_created_paths("sh -c 'mktemp -d'"));
        assert!(!prints_created_paths("touch a"));
        assert!(!prints_created_paths("echo mktemp"));
    }

    #[test]
    fn test_ansi_c_quoting() {
        assert_eq!(classify(r"echo $'\'' > victim.txt #'"), RiskCategory::FileAltering);
        assert_eq!(classify(r"echo $'a\tb'"), RiskCategory::Safe);
        assert_eq!(classify(r"echo $'it\'s'; rm x"), RiskCategory::FileAltering);
        assert_eq!(classify(r"$'rm' -rf build"), RiskCategory::FileAltering);
        assert_eq!(classify("echo $'open"), RiskCategory::FileAltering);
    }

    #[test]
    fn test_writing_arguments_to_read_only_tools_alter() {
        assert_all(
            &[
                "sed -n '/err/w errors.txt' app.log",
                "sed '1e rm -rf build' input.txt",
                "awk '{ print | \"sh\" }' input",
                "awk -f prog.awk input",
                "uniq input.txt victim.txt",
                "xxd -r dump.hex out.bin",
                "tree -o listing.txt",
                "fd -e o -x rm",
                "curl -D headers.txt https://example.com",
                "curl --cookie-jar jar.txt https://example.com",
                "git -c core.fsmonitor='rm -rf x' status",
                "git log --output=log.txt",
                "sudo sed 's/a/b/w out' f",
                "bash -c \"uniq a b\"",
            ],
            RiskCategory::FileAltering,
        );
    }

    #[test]
    fn test_unbalanced_input_alters() {
        assert_all(
            &["echo 'unterminated", "echo $(ls", "echo \"open"],
            RiskCategory::FileAltering,
        );
    }

    #[test]
    fn test_wrappers_are_stripped() {
        assert_eq!(classify("sudo ls /root"), RiskCategory::Safe);
        assert_eq!(classify("sudo rm -rf /tmp/x"), RiskCategory::FileAltering);
        assert_eq!(classify("env FOO=1 touch a"), RiskCategory::FileCreating);
        assert_eq!(classify("timeout 5 cat f"), RiskCategory::Safe);
        assert_eq!(classify("find . -name x | xargs rm"), RiskCategory::FileAltering);
        assert_eq!(classify("nohup sleep 10 &"), RiskCategory::Safe);
    }

    #[test]
    fn test_nested_shell_scripts() {
        assert_eq!(classify("sh -c 'ls -la'"), RiskCategory::Safe);
        assert_eq!(classify("bash -c 'rm -rf build'"), RiskCategory::FileAltering);
        assert_eq!(classify("bash deploy.sh"), RiskCategory::FileAltering);
        assert_eq!(classify("eval \"$CMD\""), RiskCategory::FileAltering);
        assert_eq!(classify("source ~/.bashrc"), RiskCategory::FileAltering);
    }

    #[test]
    fn test_depth_limit_alters() {
        let mut command = "ls".to_string();
        for _ in 0..(MAX_DEPTH + 2) {
            command = format!("echo $({})", command);
        }
        assert_eq!(classify(&command), RiskCategory::FileAltering);
    }

    #[test]
    fn test_empty_command_alters() {
        assert_eq!(classify(""), RiskCategory::FileAltering);
        assert_eq!(classify("   "), RiskCategory::FileAltering);
    }

    // ===== Creation targets =====

    #[test]
    fn test_creation_targets() {
        assert_eq!(creation_targets("touch notes.txt"), vec!["notes.txt"]);
        assert_eq!(
            creation_targets("mkdir -p a/b && touch a/b/c.txt"),
            vec!["a/b", "a/b/c.txt"]
        );
        assert_eq!(creation_targets("sh -c 'touch x y'"), vec!["x", "y"]);
        assert!(creation_targets("ls -la").is_empty());
    }
}
