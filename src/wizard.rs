//! The five-step annotation flow as a linear page switch.
//!
//! Welcome, load a dataset, enter classes, review them, then annotate. Each
//! step can only be left once its input is in place; the last transition
//! hands back an [`AnnotationSession`].

use std::path::Path;

use crate::error::YoloclsError;
use crate::session::{AnnotationSession, Dataset, DatasetLayout, SessionOptions};

/// Pages in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Page {
    Welcome,
    LoadDataset,
    EnterClasses,
    ReviewClasses,
    Annotate,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Welcome,
        Page::LoadDataset,
        Page::EnterClasses,
        Page::ReviewClasses,
        Page::Annotate,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Welcome => "Welcome",
            Page::LoadDataset => "Load Dataset",
            Page::EnterClasses => "Enter Image Classes",
            Page::ReviewClasses => "Review and Confirm Classes",
            Page::Annotate => "Label Conversion",
        }
    }

    fn next(self) -> Option<Page> {
        Page::ALL.get(self.index() + 1).copied()
    }
}

/// Inputs gathered on the way to the annotation page.
#[derive(Debug)]
pub struct Wizard {
    page: Page,
    layout: Option<DatasetLayout>,
    classes: Vec<String>,
    options: SessionOptions,
}

impl Wizard {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            page: Page::Welcome,
            layout: None,
            classes: Vec::new(),
            options,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn layout(&self) -> Option<&DatasetLayout> {
        self.layout.as_ref()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Discovers the dataset layout under `root`. A failed load keeps any
    /// previously loaded layout.
    pub fn load_dataset(&mut self, root: &Path) -> Result<&DatasetLayout, YoloclsError> {
        let layout = DatasetLayout::discover(root)?;
        Ok(self.layout.insert(layout))
    }

    /// Appends a class name. Input is trimmed; blank input is ignored.
    /// Returns true if a class was added.
    pub fn add_class(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.classes.push(name.to_string());
        true
    }

    /// True when the current page's input is complete.
    pub fn can_advance(&self) -> bool {
        match self.page {
            Page::Welcome | Page::ReviewClasses => true,
            Page::LoadDataset => self.layout.is_some(),
            Page::EnterClasses => !self.classes.is_empty(),
            Page::Annotate => false,
        }
    }

    /// Moves to the next page. Returns the new page, or `None` if the current
    /// page is incomplete or is the annotation page.
    ///
    /// Leaving the review page requires [`Wizard::start_session`] instead.
    pub fn advance(&mut self) -> Option<Page> {
        if !self.can_advance() || self.page == Page::ReviewClasses {
            return None;
        }
        let next = self.page.next()?;
        self.page = next;
        Some(next)
    }

    /// Leaves the review page: opens the session and displays image 0.
    ///
    /// The display result is returned separately so that a broken first image
    /// does not prevent the session from starting.
    pub fn start_session(
        &mut self,
    ) -> Result<(AnnotationSession, Result<(), YoloclsError>), YoloclsError> {
        let layout = match (&self.layout, self.page) {
            (Some(layout), Page::ReviewClasses) => layout.clone(),
            _ => {
                return Err(YoloclsError::DatasetLayoutInvalid {
                    path: self
                        .layout
                        .as_ref()
                        .map(|l| l.root.clone())
                        .unwrap_or_default(),
                    message: format!(
                        "cannot start annotating from the '{}' page",
                        self.page.title()
                    ),
                })
            }
        };

        let dataset = Dataset {
            layout,
            classes: self.classes.clone(),
        };
        let mut session = AnnotationSession::open(dataset, self.options)?;
        let first = session.display(0).map(|_| ());
        self.page = Page::Annotate;
        Ok((session, first))
    }
}
