//! Command-line PDF engine.
//!
//! Converts the staged Markdown to a standalone HTML document with
//! pulldown-cmark, inlines the stylesheet, and pipes the result into an
//! HTML-to-PDF command (`wkhtmltopdf` by default) that writes the output path.

use std::fs;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::thread;

use log::debug;
use pulldown_cmark::{html, Event, Options, Parser};

use super::renderer::{DialectOptions, RenderJob, Renderer};
use super::RenderError;

/// Renderer backed by an external HTML-to-PDF executable.
///
/// The command is invoked as `<command> [args...] - <output.pdf>` and must
/// read the HTML document from stdin.
#[derive(Debug, Clone)]
pub struct HtmlCommandRenderer {
    command: String,
    args: Vec<String>,
}

impl HtmlCommandRenderer {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

impl Renderer for HtmlCommandRenderer {
    fn render(&self, job: &RenderJob) -> Result<(), RenderError> {
        let markdown = fs::read(&job.input).map_err(RenderError::ReadInput)?;
        // Uploads are not guaranteed to be UTF-8; invalid sequences become U+FFFD.
        let markdown = String::from_utf8_lossy(&markdown);
        let css = fs::read_to_string(&job.stylesheet).map_err(RenderError::ReadStylesheet)?;
        let document = html_document(&markdown, &css, job.options);

        debug!(
            "Running {} {:?} for {:?} -> {:?}",
            self.command, self.args, job.input, job.output
        );

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .arg("-")
            .arg(&job.output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RenderError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        // Stdin is fed from its own thread while `wait_with_output` drains
        // stderr, so a full stderr pipe cannot stall the write.
        let stdin = child.stdin.take();
        let (output, written) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(document.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            (output, writer.join())
        });

        let output = output.map_err(|source| RenderError::Spawn {
            command: self.command.clone(),
            source,
        })?;

        match written {
            Ok(Ok(())) => {}
            // A command that exits without reading stdin is judged by its exit status.
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(RenderError::Stdin(e)),
            Err(_) => return Err(RenderError::Other("stdin writer thread panicked".to_string())),
        }

        if !output.status.success() {
            return Err(RenderError::Exit {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }

    fn describe(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// Render Markdown to an HTML fragment using the given dialect.
pub fn markdown_to_html(markdown: &str, options: DialectOptions) -> String {
    let mut md_options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    if options.footnotes {
        md_options.insert(Options::ENABLE_FOOTNOTES);
    }
    if options.superscript {
        md_options.insert(Options::ENABLE_SUPERSCRIPT);
    }
    if options.subscript {
        md_options.insert(Options::ENABLE_SUBSCRIPT);
    }

    let events = Parser::new_ext(markdown, md_options).map(|event| match event {
        Event::SoftBreak if options.breaks => Event::HardBreak,
        Event::Html(raw) | Event::InlineHtml(raw) if !options.html => Event::Text(raw),
        other => other,
    });

    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, events);
    body
}

/// Wrap the rendered body in a full HTML page with the stylesheet inlined.
pub fn html_document(markdown: &str, css: &str, options: DialectOptions) -> String {
    let body = markdown_to_html(markdown, options);
    let css = css.replace("</style", "<\\/style");
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n{css}\n</style>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}
