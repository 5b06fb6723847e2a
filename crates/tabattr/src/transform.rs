/*
 * transform.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Document transforms and the pipeline that runs them.
//!
//! The filter registers its transforms once, at start-up, and runs them in
//! registration order over each document it reads:
//!
//! ```ignore
//! let mut pipeline = TransformPipeline::new();
//! pipeline.push(Box::new(TableAttrTransform::new()));
//! pipeline.execute(&mut doc, &mut ctx)?;
//! ```

use crate::errors::Result;
use crate::filter_context::FilterContext;
use tabattr_pandoc_types::Pandoc;

/// A rewrite of a whole document.
///
/// Problems that should not abort the run go to `ctx` as warnings; an `Err`
/// stops the pipeline.
pub trait AstTransform: Send + Sync {
    /// Name used in log output.
    fn name(&self) -> &str;

    fn transform(&self, doc: &mut Pandoc, ctx: &mut FilterContext) -> Result<()>;
}

/// Transforms run in the order they were pushed.
pub struct TransformPipeline {
    transforms: Vec<Box<dyn AstTransform>>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    pub fn push(&mut self, transform: Box<dyn AstTransform>) {
        self.transforms.push(transform);
    }

    /// Run every transform over `doc`, stopping at the first error.
    pub fn execute(&self, doc: &mut Pandoc, ctx: &mut FilterContext) -> Result<()> {
        for transform in &self.transforms {
            tracing::debug!(transform = transform.name(), "Running transform");
            transform.transform(doc, ctx)?;
        }
        Ok(())
    }
}

impl Default for TransformPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TabattrError;
    use std::sync::{Arc, Mutex};
    use tabattr_pandoc_types::{Block, HorizontalRule};

    /// Appends a horizontal rule and records its name in the shared log.
    struct AppendRule {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl AstTransform for AppendRule {
        fn name(&self) -> &str {
            self.name
        }

        fn transform(&self, doc: &mut Pandoc, _ctx: &mut FilterContext) -> Result<()> {
            doc.blocks.push(Block::HorizontalRule(HorizontalRule));
            self.log.lock().unwrap().push(self.name);
            Ok(())
        }
    }

    struct Broken;

    impl AstTransform for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn transform(&self, _doc: &mut Pandoc, _ctx: &mut FilterContext) -> Result<()> {
            Err(std::io::Error::other("broken transform").into())
        }
    }

    fn append_rule(name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> Box<dyn AstTransform> {
        Box::new(AppendRule {
            name,
            log: log.clone(),
        })
    }

    #[test]
    fn test_empty_pipeline_leaves_document_alone() {
        let mut doc = Pandoc::default();
        let mut ctx = FilterContext::new();
        TransformPipeline::default().execute(&mut doc, &mut ctx).unwrap();
        assert_eq!(doc, Pandoc::default());
    }

    #[test]
    fn test_transforms_run_in_push_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = TransformPipeline::new();
        pipeline.push(append_rule("first", &log));
        pipeline.push(append_rule("second", &log));

        let mut doc = Pandoc::default();
        let mut ctx = FilterContext::new();
        pipeline.execute(&mut doc, &mut ctx).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
        assert_eq!(doc.blocks.len(), 2);
    }

    #[test]
    fn test_error_stops_the_pipeline() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = TransformPipeline::new();
        pipeline.push(append_rule("before", &log));
        pipeline.push(Box::new(Broken));
        pipeline.push(append_rule("after", &log));

        let mut doc = Pandoc::default();
        let mut ctx = FilterContext::new();
        let result = pipeline.execute(&mut doc, &mut ctx);

        assert!(matches!(result, Err(TabattrError::Io(_))));
        assert_eq!(*log.lock().unwrap(), vec!["before"]);
    }
}
