//! In-place optimizers for generated style sheets, scripts and HTML.
//!
//! Uses lightningcss for CSS, oxc for JavaScript and minify-html for HTML.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("Can't optimize {kind}: {message}")]
pub struct OptimizeError {
    pub kind: &'static str,
    pub message: String,
}

/// A minifier for one output file type
pub trait Optimizer {
    /// Type name, matching the `postprocess.<kind>` config section
    fn kind(&self) -> &'static str;

    fn optimize(&self, source: &[u8]) -> Result<Vec<u8>, OptimizeError>;

    fn error(&self, message: impl Into<String>) -> OptimizeError
    where
        Self: Sized,
    {
        OptimizeError {
            kind: self.kind(),
            message: message.into(),
        }
    }
}

fn utf8<'a, O: Optimizer>(optimizer: &O, source: &'a [u8]) -> Result<&'a str, OptimizeError> {
    std::str::from_utf8(source).map_err(|e| optimizer.error(e.to_string()))
}

pub struct CssOptimizer;

impl Optimizer for CssOptimizer {
    fn kind(&self) -> &'static str {
        "css"
    }

    fn optimize(&self, source: &[u8]) -> Result<Vec<u8>, OptimizeError> {
        let source = utf8(self, source)?;
        let stylesheet = StyleSheet::parse(source, ParserOptions::default())
            .map_err(|e| self.error(e.to_string()))?;
        let result = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..PrinterOptions::default()
            })
            .map_err(|e| self.error(e.to_string()))?;
        Ok(result.code.into_bytes())
    }
}

pub struct JsOptimizer;

impl Optimizer for JsOptimizer {
    fn kind(&self) -> &'static str {
        "js"
    }

    fn optimize(&self, source: &[u8]) -> Result<Vec<u8>, OptimizeError> {
        let source = utf8(self, source)?;
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
        if let Some(first) = ret.errors.first() {
            return Err(self.error(first.to_string()));
        }

        let mut program = ret.program;
        let options = MinifierOptions {
            mangle: Some(MangleOptions::default()),
            compress: Some(CompressOptions::smallest()),
        };
        let ret = Minifier::new(options).minify(&allocator, &mut program);
        let code = Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                comments: CommentOptions::disabled(),
                ..CodegenOptions::default()
            })
            .with_scoping(ret.scoping)
            .build(&program)
            .code;
        Ok(code.into_bytes())
    }
}

pub struct HtmlOptimizer {
    cfg: minify_html::Cfg,
}

impl HtmlOptimizer {
    pub fn new() -> Self {
        let mut cfg = minify_html::Cfg::new();
        cfg.keep_closing_tags = true;
        cfg.keep_html_and_head_opening_tags = true;
        cfg.keep_comments = false;
        cfg.minify_css = true;
        cfg.minify_js = true;
        cfg.remove_bangs = true;
        cfg.remove_processing_instructions = true;
        Self { cfg }
    }
}

impl Default for HtmlOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer for HtmlOptimizer {
    fn kind(&self) -> &'static str {
        "html"
    }

    fn optimize(&self, source: &[u8]) -> Result<Vec<u8>, OptimizeError> {
        Ok(minify_html::minify(source, &self.cfg))
    }
}
