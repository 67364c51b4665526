//! Dependency-pinning (DEPS) files.
//!
//! A DEPS file is a small Python-literal document:
//!
//! ```text
//! vars = {
//!   "git_url": "https://chromium.googlesource.com",
//! }
//!
//! deps = {
//!   "src/third_party/foo": Var("git_url") + "/chromium/deps/foo.git@1234abcd",
//! }
//!
//! deps_os = {
//!   "win": { "src/third_party/bar": "https://host/chromium/deps/bar.git" },
//! }
//! ```
//!
//! Only what the manifest needs is interpreted: string values, `Var()`
//! references, `+` and `%` on strings. `From()` references and `None`
//! values carry no repository and are ignored. Other top-level assignments
//! (`hooks`, `include_rules`, ...) are parsed and discarded.

use crate::error::{Result, UpdateError};
use regex::Regex;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Source of path → project mappings for a dependency file.
pub trait DepsReader {
    /// Maps each checkout-relative path to the project id checked out there.
    fn read_mappings(&self, deps_file: &Path) -> Result<BTreeMap<String, String>>;
}

impl<F> DepsReader for F
where
    F: Fn(&Path) -> Result<BTreeMap<String, String>>,
{
    fn read_mappings(&self, deps_file: &Path) -> Result<BTreeMap<String, String>> {
        self(deps_file)
    }
}

/// Reads DEPS files from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct DepsFileReader;

impl DepsReader for DepsFileReader {
    fn read_mappings(&self, deps_file: &Path) -> Result<BTreeMap<String, String>> {
        let content = fs::read_to_string(deps_file)?;
        let deps = DepsFile::parse(&content).map_err(|message| UpdateError::DepsParse {
            path: deps_file.to_path_buf(),
            message,
        })?;
        deps.project_mappings()
    }
}

/// Parsed contents of a DEPS file with variables resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepsFile {
    /// Path → repository URL, OS-specific entries merged in.
    pub deps: BTreeMap<String, String>,
}

impl DepsFile {
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let tokens = tokenize(content)?;
        let assignments = Parser::new(tokens).parse_module()?;

        let mut vars: HashMap<String, String> = HashMap::new();
        if let Some(Expr::Dict(entries)) = assignments.get("vars") {
            for (key, value) in entries {
                let Expr::Str(name) = key else { continue };
                if let Some(resolved) = resolve(value, &vars)? {
                    vars.insert(name.clone(), resolved);
                }
            }
        }

        let mut deps = BTreeMap::new();
        if let Some(expr) = assignments.get("deps") {
            merge_deps(&mut deps, expr, &vars)?;
        }

        if let Some(Expr::Dict(os_tables)) = assignments.get("deps_os") {
            let mut tables: Vec<_> = os_tables
                .iter()
                .filter_map(|(os, table)| match os {
                    Expr::Str(os) => Some((os, table)),
                    _ => None,
                })
                .collect();
            tables.sort_by(|a, b| a.0.cmp(b.0));

            for (os, table) in tables {
                log::debug!("Merging deps_os[{}]", os);
                merge_deps(&mut deps, table, &vars)?;
            }
        }

        Ok(Self { deps })
    }

    /// Maps each dependency path to its project id.
    pub fn project_mappings(&self) -> Result<BTreeMap<String, String>> {
        let re = project_regex()?;
        Ok(self
            .deps
            .iter()
            .filter_map(|(path, url)| {
                let project = url_to_project(&re, url);
                if project.is_none() {
                    log::debug!("No project in url '{}' for {}", url, path);
                }
                project.map(|p| (path.clone(), p))
            })
            .collect())
    }
}

fn merge_deps(
    deps: &mut BTreeMap<String, String>,
    table: &Expr,
    vars: &HashMap<String, String>,
) -> std::result::Result<(), String> {
    let Expr::Dict(entries) = table else {
        return Err("deps table must be a dict".to_string());
    };

    for (key, value) in entries {
        let Expr::Str(path) = key else {
            return Err("deps keys must be strings".to_string());
        };
        let Some(url) = resolve(value, vars)? else {
            log::debug!("Ignoring {} (no repository)", path);
            continue;
        };
        match deps.entry(path.clone()) {
            Entry::Occupied(existing) => {
                if existing.get() != &url {
                    log::debug!("Keeping {} for {} over {}", existing.get(), path, url);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(url);
            }
        }
    }
    Ok(())
}

fn project_regex() -> Result<Regex> {
    Ok(Regex::new(
        r"^(?:[A-Za-z][A-Za-z0-9+.-]*://[^/]+/|[^@/:]+@[^:/]+:)?(?:git/)?([^@]+?)(?:\.git)?/*(?:@.*)?$",
    )?)
}

/// Extracts the project id from a repository URL: host, revision and
/// `.git` suffix removed.
fn url_to_project(re: &Regex, url: &str) -> Option<String> {
    let caps = re.captures(url.trim())?;
    let project = caps.get(1)?.as_str().trim_matches('/');
    if project.is_empty() || project.contains("://") {
        None
    } else {
        Some(project.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Str(String),
    Ident(String),
    Number(String),
    Punct(char),
}

fn tokenize(src: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = src.chars().peekable();
    let mut line = 1;

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '"' | '\'' => {
                let quote = c;
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == quote => break,
                        Some('\\') => match chars.next() {
                            Some('n') => value.push('\n'),
                            Some('t') => value.push('\t'),
                            Some(other) => value.push(other),
                            None => return Err(format!("unterminated string on line {}", line)),
                        },
                        Some('\n') | None => {
                            return Err(format!("unterminated string on line {}", line));
                        }
                        Some(c) => value.push(c),
                    }
                }
                tokens.push(Token::Str(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut number = String::new();
                number.push(c);
                chars.next();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        number.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(number));
            }
            '{' | '}' | '[' | ']' | '(' | ')' | ':' | ',' | '+' | '%' | '=' => {
                tokens.push(Token::Punct(c));
                chars.next();
            }
            other => {
                return Err(format!("unexpected character '{}' on line {}", other, line));
            }
        }
    }

    Ok(tokens)
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Str(String),
    None,
    Other,
    Var(String),
    From,
    List(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Concat(Box<Expr>, Box<Expr>),
    Format(Box<Expr>, Box<Expr>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(&Token::Punct(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> std::result::Result<(), String> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(format!("expected '{}', found {:?}", c, self.peek()))
        }
    }

    fn parse_module(&mut self) -> std::result::Result<HashMap<String, Expr>, String> {
        let mut assignments = HashMap::new();
        while let Some(token) = self.next() {
            let Token::Ident(name) = token else {
                return Err(format!("expected assignment, found {:?}", token));
            };
            self.expect('=')?;
            let value = self.parse_expr()?;
            assignments.insert(name, value);
        }
        Ok(assignments)
    }

    fn parse_expr(&mut self) -> std::result::Result<Expr, String> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat('+') {
                let rhs = self.parse_primary()?;
                expr = Expr::Concat(Box::new(expr), Box::new(rhs));
            } else if self.eat('%') {
                let rhs = self.parse_primary()?;
                expr = Expr::Format(Box::new(expr), Box::new(rhs));
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> std::result::Result<Expr, String> {
        match self.next() {
            Some(Token::Str(mut value)) => {
                // Adjacent literals concatenate.
                while let Some(Token::Str(more)) = self.peek() {
                    value.push_str(more);
                    self.pos += 1;
                }
                Ok(Expr::Str(value))
            }
            Some(Token::Number(_)) => Ok(Expr::Other),
            Some(Token::Ident(ident)) => match ident.as_str() {
                "None" => Ok(Expr::None),
                "True" | "False" => Ok(Expr::Other),
                "Var" => {
                    let args = self.parse_call_args()?;
                    match args.as_slice() {
                        [Expr::Str(name)] => Ok(Expr::Var(name.clone())),
                        _ => Err("Var() takes a single string".to_string()),
                    }
                }
                "From" => {
                    self.parse_call_args()?;
                    Ok(Expr::From)
                }
                other => {
                    if self.peek() == Some(&Token::Punct('(')) {
                        self.parse_call_args()?;
                        Ok(Expr::Other)
                    } else {
                        Err(format!("unknown name '{}'", other))
                    }
                }
            },
            Some(Token::Punct('{')) => {
                let mut entries = Vec::new();
                while !self.eat('}') {
                    let key = self.parse_expr()?;
                    self.expect(':')?;
                    let value = self.parse_expr()?;
                    entries.push((key, value));
                    if !self.eat(',') {
                        self.expect('}')?;
                        break;
                    }
                }
                Ok(Expr::Dict(entries))
            }
            Some(Token::Punct('[')) => Ok(Expr::List(self.parse_sequence(']')?)),
            Some(Token::Punct('(')) => {
                let mut items = self.parse_sequence(')')?;
                if items.len() == 1 {
                    Ok(items.remove(0))
                } else {
                    Ok(Expr::List(items))
                }
            }
            other => Err(format!("unexpected token {:?}", other)),
        }
    }

    fn parse_call_args(&mut self) -> std::result::Result<Vec<Expr>, String> {
        self.expect('(')?;
        self.parse_sequence(')')
    }

    fn parse_sequence(&mut self, close: char) -> std::result::Result<Vec<Expr>, String> {
        let mut items = Vec::new();
        while !self.eat(close) {
            items.push(self.parse_expr()?);
            if !self.eat(',') {
                self.expect(close)?;
                break;
            }
        }
        Ok(items)
    }
}

/// Evaluates a dependency value to a URL. `Ok(None)` means the entry has no
/// repository of its own.
fn resolve(
    expr: &Expr,
    vars: &HashMap<String, String>,
) -> std::result::Result<Option<String>, String> {
    match expr {
        Expr::Str(s) => Ok(Some(s.clone())),
        Expr::None | Expr::From => Ok(None),
        Expr::Var(name) => vars
            .get(name)
            .cloned()
            .map(Some)
            .ok_or_else(|| format!("undefined variable '{}'", name)),
        Expr::Concat(lhs, rhs) => match (resolve(lhs, vars)?, resolve(rhs, vars)?) {
            (Some(l), Some(r)) => Ok(Some(l + &r)),
            _ => Ok(None),
        },
        Expr::Format(lhs, rhs) => match (resolve(lhs, vars)?, resolve(rhs, vars)?) {
            (Some(l), Some(r)) => Ok(Some(l.replacen("%s", &r, 1))),
            _ => Ok(None),
        },
        // Newer files spell entries as `{"url": ..., "condition": ...}`;
        // entries without a url (cipd packages) have no repository.
        Expr::Dict(entries) => match entries
            .iter()
            .find(|(key, _)| matches!(key, Expr::Str(k) if k == "url"))
        {
            Some((_, url)) => resolve(url, vars),
            None => Ok(None),
        },
        Expr::List(_) | Expr::Other => Err("dependency value is not a string".to_string()),
    }
}
