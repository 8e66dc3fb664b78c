//! Quote-aware scanning of a command line.
//!
//! Splits a command line into simple commands and pulls out the parts that
//! matter for risk: output redirections and nested substitutions. The text
//! of each simple command is left for `shlex` to split into words.

/// Placeholder word left where a substitution was removed.
const SUBSTITUTION_PLACEHOLDER: &str = "__subst__";

/// Device files that never count as a write target.
const HARMLESS_TARGETS: &[&str] = &["/dev/null", "/dev/stdout", "/dev/stderr", "/dev/tty"];

/// The pieces of a scanned command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Scan {
    /// Simple commands, with redirections and substitutions removed.
    pub segments: Vec<String>,
    /// Files written through output redirection.
    pub write_targets: Vec<String>,
    /// Scripts found inside `$( )`, backticks, `<( )` and `>( )`.
    pub substitutions: Vec<String>,
    /// Set when the line could not be scanned reliably (unbalanced quotes,
    /// unterminated substitution, redirection without a target).
    pub malformed: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Quote {
    None,
    Single,
    Double,
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    current: String,
    scan: Scan,
}

/// Scan a command line.
pub(crate) fn scan(input: &str) -> Scan {
    let mut scanner = Scanner {
        chars: input.chars().collect(),
        pos: 0,
        current: String::new(),
        scan: Scan::default(),
    };
    scanner.run();
    scanner.scan
}

impl Scanner {
    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn at_word_start(&self) -> bool {
        self.current
            .chars()
            .last()
            .map_or(true, |c| c.is_whitespace())
    }

    fn finish_segment(&mut self) {
        let text = std::mem::take(&mut self.current);
        if !text.trim().is_empty() {
            self.scan.segments.push(text.trim().to_string());
        }
    }

    fn run(&mut self) {
        let mut quote = Quote::None;

        while let Some(c) = self.peek(0) {
            match quote {
                Quote::Single => {
                    self.current.push(c);
                    self.pos += 1;
                    if c == '\'' {
                        quote = Quote::None;
                    }
                    continue;
                }
                Quote::Double => {
                    match c {
                        '\\' => {
                            self.current.push(c);
                            if let Some(next) = self.peek(1) {
                                self.current.push(next);
                            }
                            self.pos += 2;
                        }
                        '"' => {
                            self.current.push(c);
                            self.pos += 1;
                            quote = Quote::None;
                        }
                        '$' if self.peek(1) == Some('(') => self.take_paren_substitution(2),
                        '`' => self.take_backtick_substitution(),
                        _ => {
                            self.current.push(c);
                            self.pos += 1;
                        }
                    }
                    continue;
                }
                Quote::None => {}
            }

            match c {
                '\'' => {
                    quote = Quote::Single;
                    self.current.push(c);
                    self.pos += 1;
                }
                '"' => {
                    quote = Quote::Double;
                    self.current.push(c);
                    self.pos += 1;
                }
                '\\' => {
                    self.current.push(c);
                    if let Some(next) = self.peek(1) {
                        self.current.push(next);
                    }
                    self.pos += 2;
                }
                '$' if self.peek(1) == Some('\'') => self.take_ansi_c_quote(),
                '#' if self.at_word_start() => {
                    // Comment runs to end of line
                    while let Some(c) = self.peek(0) {
                        if c == '\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                '$' if self.peek(1) == Some('(') => self.take_paren_substitution(2),
                '`' => self.take_backtick_substitution(),
                '<' | '>' if self.peek(1) == Some('(') => self.take_paren_substitution(2),
                ';' | '\n' | '(' | ')' => {
                    self.pos += 1;
                    self.finish_segment();
                }
                '|' => {
                    // `|`, `||` and `|&` all end the simple command
                    self.pos += 1;
                    if matches!(self.peek(0), Some('|') | Some('&')) {
                        self.pos += 1;
                    }
                    self.finish_segment();
                }
                '&' => {
                    if self.peek(1) == Some('>') {
                        // `&>file` / `&>>file` redirect both streams
                        self.pos += 1;
                        self.take_output_redirect();
                    } else {
                        self.pos += 1;
                        if self.peek(0) == Some('&') {
                            self.pos += 1;
                        }
                        self.finish_segment();
                    }
                }
                '>' => {
                    self.strip_fd_prefix();
                    self.take_output_redirect();
                }
                '<' => {
                    self.strip_fd_prefix();
                    self.take_input_redirect();
                }
                _ => {
                    self.current.push(c);
                    self.pos += 1;
                }
            }
        }

        if quote != Quote::None {
            self.scan.malformed = true;
        }
        self.finish_segment();
    }

    /// Drop a file descriptor number written directly before a redirection
    /// operator, as in `2>file`.
    fn strip_fd_prefix(&mut self) {
        let digits = self
            .current
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .count();
        if digits == 0 {
            return;
        }
        let keep = self.current.len() - digits;
        let preceded_by_space = self.current[..keep]
            .chars()
            .last()
            .map_or(true, |c| c.is_whitespace());
        if preceded_by_space {
            self.current.truncate(keep);
        }
    }

    /// Handle `>`, `>>`, `>|` and `>&` starting at the current `>`.
    fn take_output_redirect(&mut self) {
        // current char is '>'
        self.pos += 1;
        match self.peek(0) {
            Some('>') | Some('|') => self.pos += 1,
            Some('&') => {
                self.pos += 1;
                let word = self.read_word();
                let is_fd_dup = word == "-" || word.chars().all(|c| c.is_ascii_digit());
                if !is_fd_dup {
                    self.push_write_target(word);
                }
                return;
            }
            _ => {}
        }
        let word = self.read_word();
        self.push_write_target(word);
    }

    /// Handle `<`, `<<`, `<<<` and `<>` starting at the current `<`.
    fn take_input_redirect(&mut self) {
        self.pos += 1;
        match self.peek(0) {
            Some('>') => {
                // `<>` opens read-write
                self.pos += 1;
                let word = self.read_word();
                self.push_write_target(word);
                return;
            }
            Some('<') => {
                self.pos += 1;
                if self.peek(0) == Some('<') {
                    self.pos += 1;
                } else if self.peek(0) == Some('-') {
                    self.pos += 1;
                }
            }
            _ => {}
        }
        if self.read_word().is_empty() {
            self.scan.malformed = true;
        }
    }

    fn push_write_target(&mut self, word: String) {
        if word.is_empty() {
            self.scan.malformed = true;
            return;
        }
        if HARMLESS_TARGETS.contains(&word.as_str()) {
            return;
        }
        self.scan.write_targets.push(word);
    }

    /// Read one shell word after optional blanks, removing quotes.
    fn read_word(&mut self) -> String {
        while matches!(self.peek(0), Some(' ') | Some('\t')) {
            self.pos += 1;
        }
        let mut word = String::new();
        let mut quote = Quote::None;
        while let Some(c) = self.peek(0) {
            match quote {
                Quote::Single => {
                    if c == '\'' {
                        quote = Quote::None;
                    } else {
                        word.push(c);
                    }
                }
                Quote::Double => {
                    if c == '"' {
                        quote = Quote::None;
                    } else {
                        word.push(c);
                    }
                }
                Quote::None => {
                    if c.is_whitespace() || ";&|<>()".contains(c) {
                        break;
                    }
                    match c {
                        '$' if self.peek(1) == Some('\'') => {
                            self.pos += 2;
                            match self.read_ansi_c_body() {
                                Some(text) => word.push_str(&text),
                                None => self.scan.malformed = true,
                            }
                            continue;
                        }
                        '\'' => quote = Quote::Single,
                        '"' => quote = Quote::Double,
                        '\\' => {
                            self.pos += 1;
                            if let Some(next) = self.peek(0) {
                                word.push(next);
                            }
                        }
                        _ => word.push(c),
                    }
                }
            }
            self.pos += 1;
        }
        if quote != Quote::None {
            self.scan.malformed = true;
        }
        word
    }

    /// Consume `$'…'` and leave the same text as a single-quoted word.
    fn take_ansi_c_quote(&mut self) {
        self.pos += 2;
        match self.read_ansi_c_body() {
            Some(text) => {
                self.current.push('\'');
                self.current.push_str(&text.replace('\'', r"'\''"));
                self.current.push('\'');
            }
            None => self.scan.malformed = true,
        }
    }

    /// Read up to the closing quote of `$'…'`, decoding escapes.
    ///
    /// `None` if the closing quote is missing. Escapes other than quotes,
    /// backslash and the common control characters are kept as written.
    fn read_ansi_c_body(&mut self) -> Option<String> {
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            self.pos += 1;
            match c {
                '\'' => return Some(text),
                '\\' => {
                    let next = self.peek(0)?;
                    self.pos += 1;
                    match next {
                        'n' => text.push('\n'),
                        't' => text.push('\t'),
                        'r' => text.push('\r'),
                        '\'' | '"' | '\\' | '?' => text.push(next),
                        _ => {
                            text.push('\\');
                            text.push(next);
                        }
                    }
                }
                _ => text.push(c),
            }
        }
        None
    }

    /// Consume `$( … )`, `<( … )` or `>( … )`; `skip` is the opener length.
    fn take_paren_substitution(&mut self, skip: usize) {
        self.pos += skip;
        let start = self.pos;
        let mut depth = 1usize;
        let mut quote = Quote::None;
        while let Some(c) = self.peek(0) {
            match quote {
                Quote::Single if c == '\'' => quote = Quote::None,
                Quote::Double if c == '"' => quote = Quote::None,
                Quote::Single | Quote::Double => {}
                Quote::None => match c {
                    '$' if self.peek(1) == Some('\'') => {
                        self.pos += 2;
                        if self.read_ansi_c_body().is_none() {
                            break;
                        }
                        continue;
                    }
                    '\'' => quote = Quote::Single,
                    '"' => quote = Quote::Double,
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                },
            }
            self.pos += 1;
        }
        if depth != 0 {
            self.scan.malformed = true;
            return;
        }
        let inner: String = self.chars[start..self.pos].iter().collect();
        self.pos += 1; // closing paren
        self.scan.substitutions.push(inner);
        self.current.push_str(SUBSTITUTION_PLACEHOLDER);
    }

    fn take_backtick_substitution(&mut self) {
        self.pos += 1;
        let start = self.pos;
        while let Some(c) = self.peek(0) {
            if c == '`' {
                let inner: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                self.scan.substitutions.push(inner);
                self.current.push_str(SUBSTITUTION_PLACEHOLDER);
                return;
            }
            if c == '\\' {
                self.pos += 1;
            }
            self.pos += 1;
        }
        self.scan.malformed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_operators() {
        let scan = scan("ls -la && echo done; pwd | wc -l || true & sleep 1");
        assert_eq!(
            scan.segments,
            vec!["ls -la", "echo done", "pwd", "wc -l", "true", "sleep 1"]
        );
        assert!(!scan.malformed);
    }

    #[test]
    fn test_keeps_quoted_operators() {
        let scan = scan("echo 'a; b' \"c && d\"");
        assert_eq!(scan.segments, vec!["echo 'a; b' \"c && d\""]);
    }

    #[test]
    fn test_output_redirections() {
        let scan = scan("echo hi > out.txt; echo more >> log.txt");
        assert_eq!(scan.write_targets, vec!["out.txt", "log.txt"]);
        assert_eq!(scan.segments, vec!["echo hi", "echo more"]);
    }

    #[test]
    fn test_redirect_without_space_and_fd_prefix() {
        let scan = scan("make 2>errors.log");
        assert_eq!(scan.write_targets, vec!["errors.log"]);
        assert_eq!(scan.segments, vec!["make"]);
    }

    #[test]
    fn test_fd_duplication_is_not_a_write() {
        let scan = scan("cargo build 2>&1 | tee /dev/null >&-");
        assert!(scan.write_targets.is_empty());
    }

    #[test]
    fn test_dev_null_is_not_a_write() {
        let scan = scan("grep foo file > /dev/null 2>/dev/null");
        assert!(scan.write_targets.is_empty());
    }

    #[test]
    fn test_ampersand_redirect() {
        let scan = scan("run &> all.log");
        assert_eq!(scan.write_targets, vec!["all.log"]);
    }

    #[test]
    fn test_quoted_redirect_target() {
        let scan = scan("echo x > 'my file.txt'");
        assert_eq!(scan.write_targets, vec!["my file.txt"]);
    }

    #[test]
    fn test_input_redirect_and_heredoc_are_ignored() {
        let scan = scan("sort < input.txt; cat <<EOF");
        assert!(scan.write_targets.is_empty());
        assert_eq!(scan.segments, vec!["sort", "cat"]);
    }

    #[test]
    fn test_substitutions_are_extracted() {
        let scan = scan("echo $(rm -rf x) `date` \"$(ls)\"");
        assert_eq!(scan.substitutions, vec!["rm -rf x", "date", "ls"]);
        assert_eq!(scan.segments.len(), 1);
        assert!(scan.segments[0].starts_with("echo __subst__"));
    }

    #[test]
    fn test_nested_substitution() {
        let scan = scan("echo $(dirname $(pwd))");
        assert_eq!(scan.substitutions, vec!["dirname $(pwd)"]);
    }

    #[test]
    fn test_process_substitution() {
        let scan = scan("diff <(ls a) <(ls b)");
        assert_eq!(scan.substitutions, vec!["ls a", "ls b"]);
    }

    #[test]
    fn test_single_quotes_hide_substitution() {
        let scan = scan("echo '$(rm -rf /)'");
        assert!(scan.substitutions.is_empty());
    }

    #[test]
    fn test_unbalanced_quote_is_malformed() {
        assert!(scan("echo 'oops").malformed);
        assert!(scan("echo \"oops").malformed);
    }

    #[test]
    fn test_unterminated_substitution_is_malformed() {
        assert!(scan("echo $(ls").malformed);
        assert!(scan("echo `ls").malformed);
    }

    #[test]
    fn test_redirect_without_target_is_malformed() {
        assert!(scan("echo hi >").malformed);
    }

    #[test]
    fn test_ansi_c_quote_keeps_escaped_quote_inside() {
        let scan = scan(r"echo $'\'' > victim.txt #'");
        assert_eq!(scan.write_targets, vec!["victim.txt"]);
        assert_eq!(scan.segments, vec![r"echo ''\'''"]);
        assert!(!scan.malformed);
    }

    #[test]
    fn test_ansi_c_quote_is_rewritten_for_word_splitting() {
        let scan = scan(r"printf $'a\tb; it\'s'");
        assert_eq!(scan.segments, vec!["printf 'a\tb; it'\\''s'"]);
        assert_eq!(
            shlex::split(&scan.segments[0]).unwrap(),
            vec!["printf", "a\tb; it's"]
        );
    }

    #[test]
    fn test_ansi_c_quote_in_redirect_target_and_substitution() {
        assert_eq!(scan("echo x > $'my file'").write_targets, vec!["my file"]);

        let scan = scan(r"echo $(echo $'\')'); ls");
        assert_eq!(scan.substitutions, vec![r"echo $'\')'"]);
        assert_eq!(scan.segments, vec!["echo __subst__", "ls"]);
        assert!(!scan.malformed);
    }

    #[test]
    fn test_unterminated_ansi_c_quote_is_malformed() {
        assert!(scan("echo $'oops").malformed);
        assert!(scan(r"echo $'oops\'").malformed);
        assert!(scan("cat > $'oops").malformed);
    }

    #[test]
    fn test_comment_is_dropped() {
        let scan = scan("ls # rm -rf /");
        assert_eq!(scan.segments, vec!["ls"]);
    }

    #[test]
    fn test_hash_inside_word_is_kept() {
        let scan = scan("echo a#b");
        assert_eq!(scan.segments, vec!["echo a#b"]);
    }

    #[test]
    fn test_subshell_parens_split() {
        let scan = scan("(cd sub && ls)");
        assert_eq!(scan.segments, vec!["cd sub", "ls"]);
    }
}
