//! Evaluator for the XPath subset emitted by [`crate::xpath`].
//!
//! Grammar:
//!
//! ```text
//! path      := start ( '/' step )*
//! start     := '(' anchor ')' '[' n ']' | anchor | ( '/' step )+
//! anchor    := '//' ( '*' | name ) ( '[' '@' name '=' literal ']' )?
//! step      := name ( '[' n ']' )?
//! literal   := '...' | "..." | 'concat(' literal ( ',' literal )* ')'
//! ```

use pinpoint_dom::{Document, NodeId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("unexpected end of path")]
    UnexpectedEnd,

    #[error("unexpected {found:?} at offset {at}")]
    Unexpected { found: char, at: usize },

    #[error("invalid index at offset {0}")]
    BadIndex(usize),
}

/// Elements selected by `path`, in document order.
pub fn evaluate(doc: &Document, path: &str) -> Result<Vec<NodeId>, PathError> {
    let mut cursor = Cursor::new(path);
    let mut context = cursor.start(doc)?;
    while !cursor.done() {
        cursor.expect('/')?;
        let (name, index) = cursor.step()?;
        context = children(doc, &context, &name, index);
    }
    Ok(context)
}

fn children(doc: &Document, context: &[NodeId], name: &str, index: Option<usize>) -> Vec<NodeId> {
    let mut out = Vec::new();
    for parent in context {
        let same_tag = doc
            .node(*parent)
            .children
            .iter()
            .copied()
            .filter(|c| doc.tag(*c) == Some(name));
        match index {
            Some(n) => out.extend(same_tag.skip(n.saturating_sub(1)).take(1)),
            None => out.extend(same_tag),
        }
    }
    out
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(path: &str) -> Self {
        Self {
            chars: path.trim().chars().collect(),
            pos: 0,
        }
    }

    fn done(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_str(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    fn next(&mut self) -> Result<char, PathError> {
        let c = self.peek().ok_or(PathError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(c)
    }

    fn expect(&mut self, wanted: char) -> Result<(), PathError> {
        let at = self.pos;
        match self.next()? {
            c if c == wanted => Ok(()),
            found => Err(PathError::Unexpected { found, at }),
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().map(char::is_whitespace).unwrap_or(false) {
            self.pos += 1;
        }
    }

    fn start(&mut self, doc: &Document) -> Result<Vec<NodeId>, PathError> {
        if self.peek() == Some('(') {
            self.next()?;
            let hits = self.anchor(doc)?;
            self.expect(')')?;
            let n = self.index()?;
            return Ok(hits.get(n - 1).copied().into_iter().collect());
        }
        if self.peek_str("//") {
            return self.anchor(doc);
        }
        // Absolute: the document node is the context for the first step.
        self.expect('/')?;
        let (name, index) = self.step()?;
        Ok(children(doc, &[0], &name, index))
    }

    fn anchor(&mut self, doc: &Document) -> Result<Vec<NodeId>, PathError> {
        self.expect('/')?;
        self.expect('/')?;
        let name = if self.peek() == Some('*') {
            self.next()?;
            None
        } else {
            Some(self.name()?)
        };
        let predicate = if self.peek() == Some('[') {
            self.next()?;
            self.expect('@')?;
            let attr = self.name()?;
            self.skip_ws();
            self.expect('=')?;
            self.skip_ws();
            let value = self.literal()?;
            self.expect(']')?;
            Some((attr, value))
        } else {
            None
        };

        Ok(doc
            .elements()
            .filter(|id| name.as_deref().map(|n| doc.tag(*id) == Some(n)).unwrap_or(true))
            .filter(|id| match &predicate {
                Some((attr, value)) => doc
                    .attrs(*id)
                    .and_then(|a| a.get(attr))
                    .map(|v| v == value)
                    .unwrap_or(false),
                None => true,
            })
            .collect())
    }

    fn step(&mut self) -> Result<(String, Option<usize>), PathError> {
        let name = self.name()?;
        let index = if self.peek() == Some('[') {
            Some(self.index()?)
        } else {
            None
        };
        Ok((name, index))
    }

    fn name(&mut self) -> Result<String, PathError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '.') {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return match self.peek() {
                Some(found) => Err(PathError::Unexpected { found, at: start }),
                None => Err(PathError::UnexpectedEnd),
            };
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn index(&mut self) -> Result<usize, PathError> {
        let at = self.pos;
        self.expect('[')?;
        let start = self.pos;
        while self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            self.pos += 1;
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        self.expect(']')?;
        match digits.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(PathError::BadIndex(at)),
        }
    }

    fn literal(&mut self) -> Result<String, PathError> {
        if self.peek_str("concat(") {
            self.pos += "concat(".len();
            let mut out = String::new();
            loop {
                self.skip_ws();
                out.push_str(&self.quoted()?);
                self.skip_ws();
                match self.next()? {
                    ',' => continue,
                    ')' => return Ok(out),
                    found => {
                        return Err(PathError::Unexpected {
                            found,
                            at: self.pos - 1,
                        })
                    }
                }
            }
        }
        self.quoted()
    }

    fn quoted(&mut self) -> Result<String, PathError> {
        let at = self.pos;
        let quote = self.next()?;
        if quote != '\'' && quote != '"' {
            return Err(PathError::Unexpected { found: quote, at });
        }
        let mut out = String::new();
        loop {
            match self.next()? {
                c if c == quote => return Ok(out),
                c => out.push(c),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<div id="main"><ul><li>a</li><li><a data-x="it's">b</a></li></ul></div>
                          <div role="row"><span>1</span></div><div role="row"><span>2</span></div>"#;

    #[test]
    fn evaluates_anchors_and_steps() {
        let doc = Document::parse(PAGE).unwrap();
        let hits = evaluate(&doc, "//*[@id='main']/ul/li[2]/a").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(doc.text_of(hits[0]), "b");

        let hits = evaluate(&doc, "(//div[@role='row'])[2]/span").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(doc.text_of(hits[0]), "2");

        let hits = evaluate(&doc, "/html/body/div[1]/ul/li").unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn concat_literals() {
        let doc = Document::parse(PAGE).unwrap();
        let hits = evaluate(&doc, r#"//a[@data-x=concat('it', "'", 's')]"#).unwrap();
        assert_eq!(hits.len(), 1);
        let hits = evaluate(&doc, r#"//a[@data-x="it's"]"#).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn rejects_malformed_paths() {
        let doc = Document::parse(PAGE).unwrap();
        assert_eq!(evaluate(&doc, "//div[@id='main'"), Err(PathError::UnexpectedEnd));
        assert!(matches!(evaluate(&doc, "(//div)[0]"), Err(PathError::BadIndex(_))));
        assert!(evaluate(&doc, "//*[@id='missing']").unwrap().is_empty());
    }
}
