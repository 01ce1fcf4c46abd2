//! HTML page generation.
//!
//! Uses `quick-xml`'s writer so every text node and attribute value is
//! escaped on the way out. Void elements (`input`, `meta`, `link`) are
//! written self-closed; everything else gets an explicit end tag, since
//! browsers do not honour `<div/>`.

use std::io::Cursor;

use axum::response::Html;
use quick_xml::{
  Writer,
  events::{BytesEnd, BytesStart, BytesText, Event},
};

use crate::error::Error;

/// Which navigation entry is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
  Home,
  Members,
  AddMember,
  DoorKeys,
}

const NAV: &[(Nav, &str, &str)] = &[
  (Nav::Home, "/", "Home"),
  (Nav::Members, "/?action=members", "Members"),
  (Nav::AddMember, "/?action=addmember", "Add Member"),
  (Nav::DoorKeys, "/?action=doorkeys", "Door Keys"),
];

/// Bootstrap alert flavours.
#[derive(Debug, Clone, Copy)]
pub enum Alert {
  Success,
  Warning,
  Danger,
}

impl Alert {
  fn class(self) -> &'static str {
    match self {
      Alert::Success => "alert alert-success",
      Alert::Warning => "alert alert-warning",
      Alert::Danger => "alert alert-danger",
    }
  }
}

// ─── Page builder ────────────────────────────────────────────────────────────

/// Streams one admin page. Open with [`PageBuilder::new`], which writes the
/// shared header and navigation; close with [`PageBuilder::finish`].
pub struct PageBuilder {
  writer: Writer<Cursor<Vec<u8>>>,
  base:   String,
  failed: Option<std::io::Error>,
}

impl PageBuilder {
  pub fn new(base: &str, title: &str, active: Nav) -> Self {
    let mut page = Self {
      writer: Writer::new(Cursor::new(Vec::new())),
      base:   base.trim_end_matches('/').to_owned(),
      failed: None,
    };

    page.emit(Event::DocType(BytesText::from_escaped("html")));
    page.open("html", &[]);
    page.open("head", &[]);
    page.void("meta", &[("charset", "utf-8")]);
    page.void("meta", &[
      ("name", "viewport"),
      ("content", "width=device-width, initial-scale=1"),
    ]);
    for sheet in ["bootstrap.min.css", "bootstrap-theme.min.css", "main.css"] {
      let href = page.url(&format!("/assets/css/{sheet}"));
      page.void("link", &[("rel", "stylesheet"), ("type", "text/css"), ("href", href.as_str())]);
    }
    page.text_elem("title", &[], &format!("{title} | Hackspace DB"));
    page.close("head");

    page.open("body", &[]);
    page.open("nav", &[("class", "navbar navbar-inverse navbar-fixed-top")]);
    page.open("div", &[("class", "container")]);
    page.open("div", &[("class", "navbar-header")]);
    page.link(&page.url("/"), "Hackspace DB", Some("navbar-brand"));
    page.close("div");
    page.open("ul", &[("class", "nav navbar-nav")]);
    for (entry, path, label) in NAV {
      let class: &[(&str, &str)] = if *entry == active { &[("class", "active")] } else { &[] };
      page.open("li", class);
      page.link(&page.url(path), label, None);
      page.close("li");
    }
    page.close("ul");
    page.close("div");
    page.close("nav");
    page.open("div", &[("class", "container")]);
    page
  }

  /// `path` prefixed with the configured base path.
  pub fn url(&self, path: &str) -> String { format!("{}{path}", self.base) }

  // ── Elements ──────────────────────────────────────────────────────────────

  pub fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) -> &mut Self {
    let mut el = BytesStart::new(tag);
    for (k, v) in attrs {
      el.push_attribute((*k, *v));
    }
    self.emit(Event::Start(el))
  }

  pub fn close(&mut self, tag: &str) -> &mut Self { self.emit(Event::End(BytesEnd::new(tag))) }

  /// A void element such as `<input/>`.
  pub fn void(&mut self, tag: &str, attrs: &[(&str, &str)]) -> &mut Self {
    let mut el = BytesStart::new(tag);
    for (k, v) in attrs {
      el.push_attribute((*k, *v));
    }
    self.emit(Event::Empty(el))
  }

  pub fn text(&mut self, text: &str) -> &mut Self { self.emit(Event::Text(BytesText::new(text))) }

  pub fn text_elem(&mut self, tag: &str, attrs: &[(&str, &str)], text: &str) -> &mut Self {
    self.open(tag, attrs).text(text).close(tag)
  }

  pub fn h1(&mut self, text: &str) -> &mut Self { self.text_elem("h1", &[], text) }

  pub fn h2(&mut self, text: &str) -> &mut Self { self.text_elem("h2", &[], text) }

  pub fn p(&mut self, text: &str) -> &mut Self { self.text_elem("p", &[], text) }

  pub fn link(&mut self, href: &str, text: &str, class: Option<&str>) -> &mut Self {
    match class {
      Some(class) => self.text_elem("a", &[("href", href), ("class", class)], text),
      None => self.text_elem("a", &[("href", href)], text),
    }
  }

  pub fn alert(&mut self, kind: Alert, text: &str) -> &mut Self {
    self.text_elem("div", &[("class", kind.class())], text)
  }

  /// A table row of plain-text cells.
  pub fn row<'a>(&mut self, cell: &str, values: impl IntoIterator<Item = &'a str>) -> &mut Self {
    self.open("tr", &[]);
    for value in values {
      self.text_elem(cell, &[], value);
    }
    self.close("tr")
  }

  /// A `<dl>` of label/value pairs.
  pub fn definitions(&mut self, pairs: &[(&str, &str)]) -> &mut Self {
    self.open("dl", &[("class", "dl-horizontal")]);
    for (term, value) in pairs {
      self.text_elem("dt", &[], term);
      self.text_elem("dd", &[], value);
    }
    self.close("dl")
  }

  /// A horizontal form group: label, input and optional help text.
  pub fn field(&mut self, label: &str, input: &[(&str, &str)], help: Option<&str>) -> &mut Self {
    let id = input
      .iter()
      .find(|(k, _)| *k == "id")
      .map(|(_, v)| *v)
      .unwrap_or_default();
    self.open("div", &[("class", "form-group")]);
    self.text_elem("label", &[("for", id), ("class", "col-sm-2")], label);
    self.open("div", &[("class", "col-sm-10")]);
    self.void("input", input);
    if let Some(help) = help {
      self.text_elem("p", &[("class", "help-block")], help);
    }
    self.close("div");
    self.close("div")
  }

  /// A submit button in its own offset form group.
  pub fn submit(&mut self, label: &str) -> &mut Self {
    self.open("div", &[("class", "form-group")]);
    self.open("div", &[("class", "col-sm-offset-2 col-sm-10")]);
    self.text_elem("button", &[("type", "submit"), ("class", "btn btn-primary")], label);
    self.close("div");
    self.close("div")
  }

  // ── Output ────────────────────────────────────────────────────────────────

  pub fn finish(mut self) -> Result<Html<String>, Error> {
    self.close("div");
    self.close("body");
    self.close("html");
    if let Some(e) = self.failed {
      return Err(Error::Render(e.to_string()));
    }
    let bytes = self.writer.into_inner().into_inner();
    String::from_utf8(bytes)
      .map(Html)
      .map_err(|e| Error::Render(e.to_string()))
  }

  /// Write one event, remembering the first failure for [`finish`](Self::finish).
  fn emit(&mut self, event: Event<'_>) -> &mut Self {
    if self.failed.is_none()
      && let Err(e) = self.writer.write_event(event)
    {
      self.failed = Some(e);
    }
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn render(build: impl FnOnce(&mut PageBuilder)) -> String {
    let mut page = PageBuilder::new("/db", "Test", Nav::Members);
    build(&mut page);
    page.finish().unwrap().0
  }

  #[test]
  fn page_has_doctype_and_navigation() {
    let html = render(|_| {});
    assert!(html.starts_with("<!DOCTYPE html>"), "{html}");
    assert!(html.contains("<title>Test | Hackspace DB</title>"));
    assert!(html.contains(r#"<li class="active"><a href="/db/?action=members">Members</a></li>"#));
    assert!(html.contains(r#"href="/db/assets/css/main.css""#));
    assert!(html.ends_with("</div></body></html>"));
  }

  #[test]
  fn text_and_attributes_are_escaped() {
    let html = render(|p| {
      p.p("<script>alert(1)</script>");
      p.void("input", &[("value", r#"" onfocus="x"#)]);
    });
    assert!(html.contains("<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>"), "{html}");
    assert!(!html.contains(r#"" onfocus="x""#));
  }

  #[test]
  fn non_void_elements_are_never_self_closed() {
    let html = render(|p| {
      p.text_elem("td", &[], "");
      p.open("tbody", &[]).close("tbody");
    });
    assert!(!html.contains("<td/>"));
    assert!(html.contains("<tbody></tbody>"));
  }

  #[test]
  fn trailing_slash_in_base_is_ignored() {
    let page = PageBuilder::new("/db/", "T", Nav::Home);
    assert_eq!(page.url("/?action=members"), "/db/?action=members");
  }
}
