//! Per-program risk rules.
//!
//! A simple command is first resolved: leading assignments, shell keywords
//! and wrapper commands (`sudo`, `env`, `xargs`, ...) are peeled off until the
//! program that actually runs is found. The program name is then looked up in
//! the rule tables below. Anything not listed is treated as file-altering.

use super::RiskCategory;

/// Programs with read-only, informational or process-only effects.
const READ_ONLY: &[&str] = &[
    "[", "alias", "apropos", "arch", "basename", "bat", "bc", "cal", "cat", "cd", "cksum", "cmp",
    "column", "comm", "cut", "date", "declare", "df", "diff", "dig", "dirname", "du", "echo",
    "egrep", "exit", "expr", "export", "false", "fgrep", "file", "fold", "free", "getent",
    "grep", "groups", "hash", "head", "help", "hexdump", "history", "host", "hostname", "id",
    "info", "jobs", "jq", "kill", "less", "locale", "locate", "ls", "lsblk", "lsof", "man",
    "md5sum", "more", "nl", "nproc", "nslookup", "od", "popd", "printenv", "printf", "ps",
    "pushd", "pwd", "read", "readlink", "realpath", "rg", "seq", "set", "sha1sum", "sha256sum",
    "sha512sum", "sleep", "stat", "strings", "tac", "tail", "test", "top", "tr", "true", "tty",
    "type", "umask", "uname", "unset", "uptime", "w", "wait", "wc", "whereis", "which", "who",
    "whoami", "yes",
];

/// Programs that only create new paths.
const CREATING: &[&str] = &["mkdir", "mkfifo", "mknod", "mktemp", "touch"];

/// Shell reserved words that may precede a command.
const KEYWORDS: &[&str] = &[
    "!", "{", "}", "if", "then", "else", "elif", "fi", "do", "done", "while", "until",
];

/// Read-only git subcommands.
const GIT_READ_ONLY: &[&str] = &[
    "blame", "describe", "diff", "grep", "help", "log", "ls-files", "ls-remote", "ls-tree",
    "reflog", "rev-parse", "shortlog", "show", "status", "version",
];

/// Git options before the subcommand that take a value.
const GIT_GLOBAL_VALUE_OPTIONS: &[&str] = &["-C", "-c", "--git-dir", "--work-tree", "--namespace"];

/// Options of `git clone` / `git init` that take a value.
const GIT_VALUE_OPTIONS: &[&str] = &[
    "-b", "--branch", "-o", "--origin", "--depth", "--reference", "-c", "--config", "-j",
    "--jobs", "--filter", "--template", "--separate-git-dir",
];

/// curl options that write a local file or read a config that may.
const CURL_WRITE_OPTIONS: &[&str] = &[
    "-o", "-O", "--output", "--remote-name", "--remote-name-all", "-D", "--dump-header", "-c",
    "--cookie-jar", "--trace", "--trace-ascii", "--stderr", "--libcurl", "--etag-save", "--hsts",
    "--alt-svc", "-K", "--config",
];

/// awk options that load code from a file or extension.
const AWK_LOADING_OPTIONS: &[&str] = &[
    "-f", "--file", "-i", "--include", "-l", "--load", "-E", "--exec",
];

/// awk options that take a value.
const AWK_VALUE_OPTIONS: &[&str] = &["-F", "-v", "-e", "--field-separator", "--assign", "--source"];

/// Nested shells that run a `-c` script.
const SHELLS: &[&str] = &["sh", "bash", "zsh", "dash", "ksh", "fish"];

/// How a simple command resolved after peeling wrappers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolved {
    /// Nothing runs (empty, assignments only, or a bare keyword).
    Nothing,
    /// A program with its arguments.
    Command { program: String, args: Vec<String> },
    /// A script that a nested shell will run.
    Script(String),
    /// Code whose effect cannot be read from the text (`eval`, `source`).
    Opaque,
}

/// Peel assignments, keywords and wrappers off a word list.
pub(crate) fn resolve(words: &[String]) -> Resolved {
    let mut rest = words;

    loop {
        while let Some(first) = rest.first() {
            if is_assignment(first) || KEYWORDS.contains(&first.as_str()) {
                rest = &rest[1..];
            } else {
                break;
            }
        }

        let Some(first) = rest.first() else {
            return Resolved::Nothing;
        };
        let program = basename(first);
        let args = &rest[1..];

        let unwrapped = match program {
            "sudo" | "doas" => skip_options(
                args,
                &["-u", "-g", "-C", "-D", "-h", "-p", "-r", "-t", "-U"],
            ),
            "env" => skip_env_args(args),
            "nice" => skip_options(args, &["-n"]),
            "timeout" => skip_options(args, &["-s", "-k"]).get(1..).unwrap_or(&[]),
            "stdbuf" => skip_options(args, &["-i", "-o", "-e"]),
            "time" | "nohup" | "command" | "builtin" | "exec" => skip_options(args, &[]),
            "xargs" => {
                let inner = skip_options(
                    args,
                    &["-I", "-n", "-P", "-L", "-d", "-E", "-s", "-a", "--delimiter", "--max-args"],
                );
                if inner.is_empty() {
                    // xargs with no command runs echo
                    return Resolved::Nothing;
                }
                inner
            }
            "eval" | "source" | "." => return Resolved::Opaque,
            shell if SHELLS.contains(&shell) => {
                return match args.iter().position(|a| a == "-c") {
                    Some(idx) => match args.get(idx + 1) {
                        Some(script) => Resolved::Script(script.clone()),
                        None => Resolved::Opaque,
                    },
                    // Running a script file or an interactive shell
                    None => Resolved::Opaque,
                };
            }
            "for" | "select" => return Resolved::Nothing,
            _ => {
                return Resolved::Command {
                    program: program.to_string(),
                    args: args.to_vec(),
                }
            }
        };

        if unwrapped.is_empty() {
            return Resolved::Nothing;
        }
        rest = unwrapped;
    }
}

/// Risk of a resolved program invocation.
pub(crate) fn command_risk(program: &str, args: &[String]) -> RiskCategory {
    match program {
        "perl" | "ruby" if has_in_place_flag(args) => RiskCategory::FileAltering,
        "sed" => sed_risk(args),
        "find" => find_risk(args),
        "sort" if has_any_flag(args, &["-o", "--output", "--compress-program"]) => {
            RiskCategory::FileAltering
        }
        "sort" => RiskCategory::Safe,
        "awk" | "gawk" | "mawk" => awk_risk(args),
        "curl" if has_any_flag(args, CURL_WRITE_OPTIONS) => RiskCategory::FileAltering,
        "curl" => RiskCategory::Safe,
        // A second operand is the output file
        "uniq" if operands_skipping(args, &["-f", "-s", "-w"]).len() > 1 => {
            RiskCategory::FileAltering
        }
        "xxd" if operands_skipping(args, &["-c", "-g", "-l", "-o", "-s", "-n"]).len() > 1 => {
            RiskCategory::FileAltering
        }
        "uniq" | "xxd" => RiskCategory::Safe,
        "tree" if has_any_flag(args, &["-o"]) => RiskCategory::FileAltering,
        "tree" => RiskCategory::Safe,
        "fd" | "fdfind" if has_any_flag(args, &["-x", "--exec", "-X", "--exec-batch"]) => {
            RiskCategory::FileAltering
        }
        "fd" | "fdfind" => RiskCategory::Safe,
        "rg" if has_any_flag(args, &["--pre"]) => RiskCategory::FileAltering,
        "wget" if has_any_flag(args, &["-O", "--output-document", "-N", "-c", "--continue"]) => {
            RiskCategory::FileAltering
        }
        // wget picks a fresh name (file.1, file.2) instead of overwriting
        "wget" => RiskCategory::FileCreating,
        "cp" if has_any_flag(args, &["-n", "--no-clobber"]) => RiskCategory::FileCreating,
        "ln" if has_any_flag(args, &["-f", "--force"]) => RiskCategory::FileAltering,
        "ln" => RiskCategory::FileCreating,
        "tar" => tar_risk(args),
        "git" => git_risk(args),
        p if READ_ONLY.contains(&p) => RiskCategory::Safe,
        p if CREATING.contains(&p) => RiskCategory::FileCreating,
        _ => RiskCategory::FileAltering,
    }
}

/// Whether the program prints the path it created instead of taking it as
/// an operand.
pub(crate) fn prints_created_path(program: &str) -> bool {
    program == "mktemp"
}

/// Paths a creating command names as its output.
pub(crate) fn creation_targets(program: &str, args: &[String]) -> Vec<String> {
    match program {
        "touch" | "mkdir" | "mkfifo" | "mknod" => {
            let skip_value = match program {
                "mkdir" | "mkfifo" | "mknod" => &["-m", "--mode"][..],
                "touch" => &["-d", "-r", "-t", "--date", "--reference"][..],
                _ => &[][..],
            };
            let mut targets = operands_skipping(args, skip_value);
            if program == "mknod" {
                targets.truncate(1);
            }
            targets
        }
        "cp" | "ln" => {
            let ops = operands(args);
            if ops.len() >= 2 {
                let dest = ops[ops.len() - 1].clone();
                if ops.len() == 2 && !dest.ends_with('/') {
                    vec![dest]
                } else {
                    // Destination is a directory; each source lands inside it
                    ops[..ops.len() - 1]
                        .iter()
                        .map(|src| join_path(&dest, basename(src)))
                        .collect()
                }
            } else if program == "ln" && ops.len() == 1 {
                vec![basename(&ops[0]).to_string()]
            } else {
                Vec::new()
            }
        }
        "git" => {
            let rest = skip_options(args, GIT_GLOBAL_VALUE_OPTIONS);
            let ops = operands_skipping(rest, GIT_VALUE_OPTIONS);
            match ops.first().map(String::as_str) {
                Some("clone") => match ops.get(2) {
                    Some(dir) => vec![dir.clone()],
                    None => ops
                        .get(1)
                        .map(|url| vec![repo_dir_name(url)])
                        .unwrap_or_default(),
                },
                Some("init") => ops.get(1).cloned().into_iter().collect(),
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

fn is_assignment(word: &str) -> bool {
    let Some((name, _)) = word.split_once('=') else {
        return false;
    };
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn basename(word: &str) -> &str {
    word.rsplit('/').next().unwrap_or(word)
}

fn join_path(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Skip leading options; options listed in `with_value` consume the next word.
fn skip_options<'a>(args: &'a [String], with_value: &[&str]) -> &'a [String] {
    let mut i = 0;
    while let Some(arg) = args.get(i) {
        if arg == "--" {
            return &args[i + 1..];
        }
        if !arg.starts_with('-') || arg == "-" {
            break;
        }
        i += if with_value.contains(&arg.as_str()) { 2 } else { 1 };
    }
    args.get(i..).unwrap_or(&[])
}

fn skip_env_args(args: &[String]) -> &[String] {
    let mut i = 0;
    while let Some(arg) = args.get(i) {
        if arg == "-u" || arg == "--unset" {
            i += 2;
        } else if arg.starts_with('-') || is_assignment(arg) {
            i += 1;
        } else {
            break;
        }
    }
    args.get(i..).unwrap_or(&[])
}

fn operands(args: &[String]) -> Vec<String> {
    operands_skipping(args, &[])
}

fn operands_skipping(args: &[String], with_value: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    let mut options_done = false;
    while let Some(arg) = iter.next() {
        if options_done {
            out.push(arg.clone());
        } else if arg == "--" {
            options_done = true;
        } else if with_value.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with('-') || arg == "-" {
            out.push(arg.clone());
        }
    }
    out
}

/// True if any flag is present, including bundled short flags (`-fn`) and
/// `--long=value` forms.
fn has_any_flag(args: &[String], flags: &[&str]) -> bool {
    args.iter().any(|arg| {
        flags.iter().any(|flag| {
            if arg == flag {
                return true;
            }
            if let Some(long) = flag.strip_prefix("--") {
                return arg
                    .strip_prefix("--")
                    .and_then(|a| a.split_once('='))
                    .is_some_and(|(name, _)| name == long);
            }
            let short = flag.trim_start_matches('-');
            short.len() == 1
                && arg.starts_with('-')
                && !arg.starts_with("--")
                && arg[1..].contains(short)
        })
    })
}

fn has_in_place_flag(args: &[String]) -> bool {
    args.iter().any(|arg| {
        arg == "--in-place"
            || arg.starts_with("--in-place=")
            || (arg.starts_with("-i") && !arg.starts_with("--"))
            || (arg.starts_with('-')
                && !arg.starts_with("--")
                && arg.len() > 2
                && arg[1..].contains('i')
                && arg.chars().skip(1).all(|c| c.is_ascii_alphabetic()))
    })
}

fn find_risk(args: &[String]) -> RiskCategory {
    let writes = args.iter().any(|arg| {
        matches!(
            arg.as_str(),
            "-delete"
                | "-exec"
                | "-execdir"
                | "-ok"
                | "-okdir"
                | "-fprint"
                | "-fprint0"
                | "-fprintf"
                | "-fls"
        )
    });
    if writes {
        RiskCategory::FileAltering
    } else {
        RiskCategory::Safe
    }
}

fn awk_risk(args: &[String]) -> RiskCategory {
    if has_any_flag(args, AWK_LOADING_OPTIONS) {
        return RiskCategory::FileAltering;
    }

    let first_operand = operands_skipping(args, AWK_VALUE_OPTIONS).into_iter().next();
    let mut programs: Vec<&str> = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "-e" || arg == "--source" {
            if let Some(program) = iter.next() {
                programs.push(program);
            }
        } else if let Some(program) = arg.strip_prefix("--source=") {
            programs.push(program);
        }
    }
    if programs.is_empty() {
        programs.extend(first_operand.as_deref());
    }

    // Output redirection, pipes to or from commands, and system()
    let writes = programs
        .iter()
        .any(|p| p.contains('>') || p.contains('|') || p.contains("system("));
    if writes {
        RiskCategory::FileAltering
    } else {
        RiskCategory::Safe
    }
}

fn sed_risk(args: &[String]) -> RiskCategory {
    if has_in_place_flag(args) {
        return RiskCategory::FileAltering;
    }
    match sed_scripts(args) {
        Some(scripts) if !scripts.iter().any(|s| sed_script_writes(s)) => RiskCategory::Safe,
        _ => RiskCategory::FileAltering,
    }
}

/// Scripts passed to sed, or `None` when one comes from a file or the
/// command line cannot be read.
fn sed_scripts(args: &[String]) -> Option<Vec<String>> {
    let mut scripts = Vec::new();
    let mut operands = Vec::new();
    let mut options_done = false;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if options_done || !arg.starts_with('-') || arg == "-" {
            operands.push(arg.clone());
            continue;
        }
        if arg == "--" {
            options_done = true;
            continue;
        }
        if let Some(long) = arg.strip_prefix("--") {
            let (name, value) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (long, None),
            };
            match name {
                "expression" => scripts.push(value.or_else(|| iter.next().cloned())?),
                "file" => return None,
                "line-length" if value.is_none() => {
                    iter.next();
                }
                _ => {}
            }
            continue;
        }
        // Bundled short options; `-e`, `-f` and `-l` take the rest of the
        // word or the next one
        let flags = &arg[1..];
        for (idx, flag) in flags.char_indices() {
            let rest = &flags[idx + flag.len_utf8()..];
            match flag {
                'e' => {
                    scripts.push(option_value(rest, &mut iter)?);
                    break;
                }
                'f' => return None,
                'l' => {
                    option_value(rest, &mut iter);
                    break;
                }
                _ => {}
            }
        }
    }

    if scripts.is_empty() {
        scripts.push(operands.into_iter().next()?);
    }
    Some(scripts)
}

fn option_value(rest: &str, iter: &mut std::slice::Iter<'_, String>) -> Option<String> {
    if rest.is_empty() {
        iter.next().cloned()
    } else {
        Some(rest.to_string())
    }
}

/// Whether a sed script can write a file or run a command.
///
/// Looks for the `w`, `W` and `e` commands and the `w`/`e` flags of `s`.
/// Commands it does not know, and scripts it cannot follow, count as
/// writing.
fn sed_script_writes(script: &str) -> bool {
    let chars: Vec<char> = script.chars().collect();
    let mut i = 0;

    while let Some(&c) = chars.get(i) {
        i += 1;
        match c {
            // Separators and address parts
            ' ' | '\t' | '\n' | ';' | '{' | '}' => {}
            '0'..='9' | '$' | ',' | '~' | '+' | '!' | 'I' | 'M' => {}
            '/' => match delimited_end(&chars, i, '/') {
                Some(end) => i = end + 1,
                None => return true,
            },
            '\\' => {
                let Some(&delim) = chars.get(i) else {
                    return true;
                };
                match delimited_end(&chars, i + 1, delim) {
                    Some(end) => i = end + 1,
                    None => return true,
                }
            }
            'w' | 'W' | 'e' => return true,
            's' => {
                let Some(&delim) = chars.get(i) else {
                    return true;
                };
                let Some(pattern_end) = delimited_end(&chars, i + 1, delim) else {
                    return true;
                };
                let Some(replacement_end) = delimited_end(&chars, pattern_end + 1, delim) else {
                    return true;
                };
                i = replacement_end + 1;
                while let Some(&flag) = chars.get(i) {
                    if matches!(flag, ';' | '\n' | '}') {
                        break;
                    }
                    if matches!(flag, 'w' | 'e') {
                        return true;
                    }
                    i += 1;
                }
            }
            'y' => {
                let Some(&delim) = chars.get(i) else {
                    return true;
                };
                let Some(source_end) = delimited_end(&chars, i + 1, delim) else {
                    return true;
                };
                match delimited_end(&chars, source_end + 1, delim) {
                    Some(end) => i = end + 1,
                    None => return true,
                }
            }
            // Text and file names run to the end of the line
            '#' | 'a' | 'i' | 'c' | 'r' | 'R' => {
                while chars.get(i).is_some_and(|&c| c != '\n') {
                    i += 1;
                }
            }
            // Labels run to the next command
            ':' | 'b' | 't' | 'T' | 'v' => {
                while chars.get(i).is_some_and(|&c| !matches!(c, ';' | '\n' | '}')) {
                    i += 1;
                }
            }
            '=' | 'd' | 'D' | 'F' | 'g' | 'G' | 'h' | 'H' | 'l' | 'L' | 'n' | 'N' | 'p' | 'P'
            | 'q' | 'Q' | 'x' | 'z' => {}
            _ => return true,
        }
    }
    false
}

/// Index of the closing `delim` at or after `start`, skipping escapes.
fn delimited_end(chars: &[char], start: usize, delim: char) -> Option<usize> {
    let mut i = start;
    while let Some(&c) = chars.get(i) {
        if c == '\\' {
            i += 2;
            continue;
        }
        if c == delim {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn tar_risk(args: &[String]) -> RiskCategory {
    let Some(mode) = args.first() else {
        return RiskCategory::FileAltering;
    };
    let mode = mode.trim_start_matches('-');
    let listing_only = mode.contains('t')
        && !mode.contains('x')
        && !mode.contains('c')
        && !mode.contains('r')
        && !mode.contains('u');
    if listing_only || args.iter().any(|a| a == "--list") {
        RiskCategory::Safe
    } else {
        RiskCategory::FileAltering
    }
}

fn git_risk(args: &[String]) -> RiskCategory {
    // Skip global options such as `-C dir` or `--no-pager`
    let rest = skip_options(args, GIT_GLOBAL_VALUE_OPTIONS);
    let global = &args[..args.len() - rest.len()];

    // Config given on the command line can name a command to run, as
    // core.fsmonitor does
    let overrides_config = global.iter().any(|arg| {
        arg == "-c" || arg.starts_with("--config-env") || arg.starts_with("--exec-path")
    });
    if overrides_config || has_any_flag(args, &["--output"]) {
        return RiskCategory::FileAltering;
    }

    let Some(sub) = rest.first() else {
        return RiskCategory::Safe;
    };
    let sub_args = &rest[1..];
    match sub.as_str() {
        "grep" if has_any_flag(sub_args, &["-O", "--open-files-in-pager"]) => {
            RiskCategory::FileAltering
        }
        s if GIT_READ_ONLY.contains(&s) => RiskCategory::Safe,
        "branch" | "tag" | "remote" if is_listing(sub_args) => RiskCategory::Safe,
        "stash" if matches!(sub_args.first().map(String::as_str), Some("list") | Some("show")) => {
            RiskCategory::Safe
        }
        "config" if has_any_flag(sub_args, &["--get", "--list", "-l", "--get-all"]) => {
            RiskCategory::Safe
        }
        "clone" | "init" => RiskCategory::FileCreating,
        _ => RiskCategory::FileAltering,
    }
}

fn is_listing(args: &[String]) -> bool {
    match args.first().map(String::as_str) {
        None => true,
        Some("list") | Some("show") | Some("-v") | Some("-vv") | Some("-a") | Some("-l")
        | Some("--list") | Some("-r") => true,
        _ => false,
    }
}

/// Directory name `git clone <url>` creates.
fn repo_dir_name(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed
        .rsplit(|c| c == '/' || c == ':')
        .next()
        .unwrap_or(trimmed);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        shlex::split(s).unwrap()
    }

    fn risk(s: &str) -> RiskCategory {
        match resolve(&words(s)) {
            Resolved::Command { program, args } => command_risk(&program, &args),
            Resolved::Nothing => RiskCategory::Safe,
            _ => RiskCategory::FileAltering,
        }
    }

    #[test]
    fn test_resolve_strips_assignments() {
        assert_eq!(
            resolve(&words("FOO=1 BAR=2 ls -la")),
            Resolved::Command {
                program: "ls".to_string(),
                args: vec!["-la".to_string()]
            }
        );
        assert_eq!(resolve(&words("FOO=1")), Resolved::Nothing);
    }

    #[test]
    fn test_resolve_peels_wrappers() {
        assert_eq!(
            resolve(&words("sudo -u root nice -n 5 rm x")),
            Resolved::Command {
                program: "rm".to_string(),
                args: vec!["x".to_string()]
            }
        );
        assert_eq!(
            resolve(&words("env -u HOME LANG=C timeout 5 /bin/ls")),
            Resolved::Command {
                program: "ls".to_string(),
                args: vec![]
            }
        );
    }

    #[test]
    fn test_resolve_xargs() {
        assert_eq!(
            resolve(&words("xargs -n 1 rm")),
            Resolved::Command {
                program: "rm".to_string(),
                args: vec![]
            }
        );
        assert_eq!(resolve(&words("xargs")), Resolved::Nothing);
    }

    #[test]
    fn test_resolve_nested_shell() {
        assert_eq!(
            resolve(&words("bash -c 'rm -rf build'")),
            Resolved::Script("rm -rf build".to_string())
        );
        assert_eq!(resolve(&words("sh ./install.sh")), Resolved::Opaque);
        assert_eq!(resolve(&words("eval \"$CMD\"")), Resolved::Opaque);
        assert_eq!(resolve(&words(". ~/.profile")), Resolved::Opaque);
    }

    #[test]
    fn test_read_only_programs() {
        for cmd in ["ls -la", "cat README.md", "echo hi", "pwd", "grep -r foo .", "cd src"] {
            assert_eq!(risk(cmd), RiskCategory::Safe, "{}", cmd);
        }
    }

    #[test]
    fn test_creating_programs() {
        for cmd in ["touch notes.txt", "mkdir -p a/b", "mktemp", "ln -s a b", "cp -n a b"] {
            assert_eq!(risk(cmd), RiskCategory::FileCreating, "{}", cmd);
        }
    }

    #[test]
    fn test_altering_programs() {
        for cmd in [
            "rm -rf build/",
            "mv a b",
            "cp a b",
            "chmod +x run.sh",
            "chown me file",
            "truncate -s 0 log",
            "dd if=/dev/zero of=disk.img",
            "tee out.txt",
            "ln -sf a b",
            "unlink x",
        ] {
            assert_eq!(risk(cmd), RiskCategory::FileAltering, "{}", cmd);
        }
    }

    #[test]
    fn test_unknown_program_is_altering() {
        assert_eq!(risk("frobnicate --all"), RiskCategory::FileAltering);
        assert_eq!(risk("./deploy.sh"), RiskCategory::FileAltering);
    }

    #[test]
    fn test_sed_in_place() {
        assert_eq!(risk("sed 's/a/b/' file"), RiskCategory::Safe);
        assert_eq!(risk("sed -i 's/a/b/' file"), RiskCategory::FileAltering);
        assert_eq!(risk("sed -i.bak 's/a/b/' file"), RiskCategory::FileAltering);
        assert_eq!(risk("sed -ni 's/a/b/p' file"), RiskCategory::FileAltering);
        assert_eq!(risk("sed --in-place 's/a/b/' f"), RiskCategory::FileAltering);
        assert_eq!(risk("perl -pi -e 's/a/b/' f"), RiskCategory::FileAltering);
    }

    #[test]
    fn test_sed_scripts_that_write_or_run() {
        for cmd in [
            "sed -n '/err/w errors.txt' app.log",
            "sed 's/a/b/w changed.txt' f",
            "sed '1e rm -rf build' input.txt",
            "sed 's/.*/date/e' f",
            "sed -e p -e 'W first.txt' f",
            "sed --expression='1e id' f",
            "sed -ne '$w tail.txt' f",
            "sed -f edits.sed f",
            "sed '/x/{p;w out.txt' f",
            "sed 's/unterminated' f",
        ] {
            assert_eq!(risk(cmd), RiskCategory::FileAltering, "{}", cmd);
        }
    }

    #[test]
    fn test_sed_scripts_that_only_print() {
        for cmd in [
            "sed -n '1,5p' f",
            "sed 's/a/b/g' f",
            "sed -e 's/w/e/' f",
            "sed '/^#/d; s/e/E/2' f",
            "sed -E 's/(a|b)/\\1/' f",
            "sed 'y/abc/xyz/' f",
            "sed '$!N;P;D' f",
            "sed -n '\\,/usr/w,p' f",
            "sed '/start/,/end/{/skip/d;p}' f",
        ] {
            assert_eq!(risk(cmd), RiskCategory::Safe, "{}", cmd);
        }
    }

    #[test]
    fn test_read_only_programs_with_writing_arguments() {
        for cmd in [
            "uniq input.txt victim.txt",
            "uniq -c -f 1 input.txt counts.txt",
            "xxd -r dump.hex out.bin",
            "tree -o listing.txt",
            "fd -e rs -x rm",
            "fd --exec-batch rm",
            "rg --pre ./decode.sh needle",
            "curl -D headers.txt https://example.com",
            "curl -c jar.txt https://example.com",
            "curl --trace trace.log https://example.com",
            "curl --dump-header=h.txt https://example.com",
            "sort --compress-program=gzip big.txt",
        ] {
            assert_eq!(risk(cmd), RiskCategory::FileAltering, "{}", cmd);
        }
        for cmd in [
            "uniq -c input.txt",
            "uniq -f 1 input.txt",
            "xxd image.bin",
            "xxd -l 32 image.bin",
            "tree -L 2",
            "fd -e rs",
            "rg -n needle src/",
            "curl -sSL https://example.com",
        ] {
            assert_eq!(risk(cmd), RiskCategory::Safe, "{}", cmd);
        }
    }

    #[test]
    fn test_find_actions() {
        assert_eq!(risk("find . -name '*.rs'"), RiskCategory::Safe);
        assert_eq!(risk("find . -name '*.o' -delete"), RiskCategory::FileAltering);
        assert_eq!(risk("find . -exec rm {} ;"), RiskCategory::FileAltering);
    }

    #[test]
    fn test_sort_output() {
        assert_eq!(risk("sort names.txt"), RiskCategory::Safe);
        assert_eq!(risk("sort -o names.txt names.txt"), RiskCategory::FileAltering);
    }

    #[test]
    fn test_awk() {
        assert_eq!(risk("awk '{print $1}' f"), RiskCategory::Safe);
        assert_eq!(risk("awk '{print > \"out\"}' f"), RiskCategory::FileAltering);
        assert_eq!(risk("awk 'BEGIN{system(\"rm x\")}'"), RiskCategory::FileAltering);
    }

    #[test]
    fn test_awk_pipes_and_program_files() {
        for cmd in [
            "awk '{print | \"sh\"}' f",
            "awk 'BEGIN{\"date\" | getline d}'",
            "awk -f prog.awk f",
            "gawk -i inplace '{print}' f",
            "awk -F , '{print > \"out\"}' f",
            "gawk -e '{print > \"out\"}' f",
            "gawk --source='{print | \"sh\"}' f",
        ] {
            assert_eq!(risk(cmd), RiskCategory::FileAltering, "{}", cmd);
        }
        assert_eq!(risk("awk -F: '{print $1}' /etc/passwd"), RiskCategory::Safe);
        assert_eq!(risk("awk -v n=2 '{print $n}' f"), RiskCategory::Safe);
    }

    #[test]
    fn test_downloads() {
        assert_eq!(risk("curl https://example.com"), RiskCategory::Safe);
        assert_eq!(risk("curl -o page.html https://example.com"), RiskCategory::FileAltering);
        assert_eq!(risk("curl -sSLO https://example.com/x"), RiskCategory::FileAltering);
        assert_eq!(risk("wget https://example.com/x.tgz"), RiskCategory::FileCreating);
        assert_eq!(risk("wget -O x.tgz https://example.com/x"), RiskCategory::FileAltering);
    }

    #[test]
    fn test_tar() {
        assert_eq!(risk("tar -tzf a.tgz"), RiskCategory::Safe);
        assert_eq!(risk("tar xzf a.tgz"), RiskCategory::FileAltering);
        assert_eq!(risk("tar -czf a.tgz dir"), RiskCategory::FileAltering);
    }

    #[test]
    fn test_git_subcommands() {
        assert_eq!(risk("git status"), RiskCategory::Safe);
        assert_eq!(risk("git -C repo log --oneline"), RiskCategory::Safe);
        assert_eq!(risk("git branch"), RiskCategory::Safe);
        assert_eq!(risk("git branch -D main"), RiskCategory::FileAltering);
        assert_eq!(risk("git config --get user.name"), RiskCategory::Safe);
        assert_eq!(risk("git clone https://x/y.git"), RiskCategory::FileCreating);
        assert_eq!(risk("git init"), RiskCategory::FileCreating);
        assert_eq!(risk("git reset --hard"), RiskCategory::FileAltering);
        assert_eq!(risk("git checkout ."), RiskCategory::FileAltering);
        assert_eq!(risk("git stash"), RiskCategory::FileAltering);
        assert_eq!(risk("git stash list"), RiskCategory::Safe);
        assert_eq!(risk("git frobnicate"), RiskCategory::FileAltering);
    }

    #[test]
    fn test_git_config_overrides_and_output_files() {
        for cmd in [
            "git -c core.fsmonitor='touch pwned' status",
            "git -c alias.st='!rm -rf x' st",
            "git --config-env=core.pager=PAGER log",
            "git --exec-path=/tmp/bin status",
            "git log --output=log.txt",
            "git diff --output out.patch",
            "git grep -O vim needle",
        ] {
            assert_eq!(risk(cmd), RiskCategory::FileAltering, "{}", cmd);
        }
        assert_eq!(risk("git --no-pager log -3"), RiskCategory::Safe);
        assert_eq!(risk("git -C repo diff --stat"), RiskCategory::Safe);
    }

    #[test]
    fn test_sed_script_writes() {
        assert!(!sed_script_writes("s/a/b/gp"));
        assert!(sed_script_writes("s/a/b/gw out"));
        assert!(sed_script_writes("1~2e date"));
        assert!(!sed_script_writes("a wait, this is text"));
        assert!(sed_script_writes("a text\nw out"));
        assert!(!sed_script_writes(":top;N;btop"));
        assert!(sed_script_writes(":top;w out"));
        assert!(sed_script_writes("k"));
    }

    #[test]
    fn test_creation_targets_touch_and_mkdir() {
        assert_eq!(
            creation_targets("touch", &words("-c notes.txt todo.md")),
            vec!["notes.txt", "todo.md"]
        );
        assert_eq!(
            creation_targets("mkdir", &words("-p -m 755 a/b")),
            vec!["a/b"]
        );
    }

    #[test]
    fn test_creation_targets_copy_and_link() {
        assert_eq!(creation_targets("cp", &words("-n a.txt b.txt")), vec!["b.txt"]);
        assert_eq!(
            creation_targets("cp", &words("-n a.txt src/b.rs out/")),
            vec!["out/a.txt", "out/b.rs"]
        );
        assert_eq!(creation_targets("ln", &words("-s /etc/hosts")), vec!["hosts"]);
    }

    #[test]
    fn test_creation_targets_git_clone() {
        assert_eq!(
            creation_targets("git", &words("clone https://github.com/a/repo.git")),
            vec!["repo"]
        );
        assert_eq!(
            creation_targets("git", &words("clone git@github.com:a/repo.git mine")),
            vec!["mine"]
        );
        assert_eq!(creation_targets("git", &words("init proj")), vec!["proj"]);
        assert_eq!(
            creation_targets("git", &words("clone --depth 1 https://x/y.git")),
            vec!["y"]
        );
    }

    #[test]
    fn test_has_any_flag_forms() {
        assert!(has_any_flag(&words("-sSLo out"), &["-o"]));
        assert!(has_any_flag(&words("--output=x"), &["--output"]));
        assert!(!has_any_flag(&words("--outputs"), &["--output"]));
        assert!(!has_any_flag(&words("file"), &["-o"]));
    }
}
