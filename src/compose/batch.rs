use serde::{Deserialize, Serialize};

use crate::compose::compositor::Composite;
use crate::model::template::AdTemplate;

/// Outcome of compositing one template in a batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedAd {
    pub template: AdTemplate,
    /// `data:` URL of the encoded image; empty when compositing failed.
    pub image_url: String,
    pub name: String,
    /// `"<width>x<height>"`.
    pub size: String,
    pub platform: String,
}

impl GeneratedAd {
    fn new(template: AdTemplate, image_url: String) -> Self {
        Self {
            name: template.name.clone(),
            size: template.dimensions_label(),
            platform: template.size.platform.clone(),
            template,
            image_url,
        }
    }

    pub fn has_image(&self) -> bool {
        !self.image_url.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    /// `completed / total * 100`.
    pub percent: f64,
}

/// Event stream of a batch run: one progress event per template, then the results.
#[derive(Clone, Debug, PartialEq)]
pub enum BatchEvent {
    Progress(BatchProgress),
    Finished(Vec<GeneratedAd>),
}

/// Composites templates one after another, isolating per-template failures.
#[derive(Debug)]
pub struct BatchCompositor<C> {
    compositor: C,
}

impl<C: Composite> BatchCompositor<C> {
    pub fn new(compositor: C) -> Self {
        Self { compositor }
    }

    pub fn compositor(&self) -> &C {
        &self.compositor
    }

    /// Lazy run: each `next()` composites at most one template.
    pub fn run(&self, templates: Vec<AdTemplate>) -> BatchRun<'_, C> {
        BatchRun {
            compositor: &self.compositor,
            total: templates.len(),
            pending: templates.into_iter(),
            ads: Vec::new(),
            finished: false,
        }
    }

    /// Drive a whole run, reporting progress through `on_progress`.
    #[tracing::instrument(skip_all, fields(templates = templates.len()))]
    pub fn composite_all(
        &self,
        templates: Vec<AdTemplate>,
        mut on_progress: impl FnMut(BatchProgress),
    ) -> Vec<GeneratedAd> {
        let mut out = Vec::new();
        for event in self.run(templates) {
            match event {
                BatchEvent::Progress(p) => on_progress(p),
                BatchEvent::Finished(ads) => out = ads,
            }
        }
        out
    }
}

/// Iterator returned by [`BatchCompositor::run`].
pub struct BatchRun<'a, C> {
    compositor: &'a C,
    pending: std::vec::IntoIter<AdTemplate>,
    total: usize,
    ads: Vec<GeneratedAd>,
    finished: bool,
}

impl<C: Composite> Iterator for BatchRun<'_, C> {
    type Item = BatchEvent;

    fn next(&mut self) -> Option<BatchEvent> {
        let Some(template) = self.pending.next() else {
            if self.finished {
                return None;
            }
            self.finished = true;
            return Some(BatchEvent::Finished(std::mem::take(&mut self.ads)));
        };

        let image_url = match self.compositor.composite(&template) {
            Ok(encoded) => encoded.to_data_url(),
            Err(e) => {
                tracing::error!(template = %template.name, error = %e, "error generating ad");
                String::new()
            }
        };
        self.ads.push(GeneratedAd::new(template, image_url));

        let completed = self.ads.len();
        Some(BatchEvent::Progress(BatchProgress {
            completed,
            total: self.total,
            percent: completed as f64 / self.total as f64 * 100.0,
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.pending.len() + usize::from(!self.finished);
        (n, Some(n))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/batch.rs"]
mod tests;
