//! Full-screen viewer state with previous/next traversal.

/// Which list the lightbox was opened from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxSource {
    Grid,
    /// Origin images of one match group in the search results.
    Results { group: usize },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Lightbox {
    #[default]
    Closed,
    Open {
        source: LightboxSource,
        context: Vec<String>,
        index: usize,
    },
}

impl Lightbox {
    /// Open on `context[index]`. An out-of-range index leaves it closed.
    pub fn opened(source: LightboxSource, context: Vec<String>, index: usize) -> Self {
        if index < context.len() {
            Lightbox::Open {
                source,
                context,
                index,
            }
        } else {
            Lightbox::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Lightbox::Open { .. })
    }

    pub fn source(&self) -> Option<LightboxSource> {
        match self {
            Lightbox::Open { source, .. } => Some(*source),
            Lightbox::Closed => None,
        }
    }

    pub fn current(&self) -> Option<&str> {
        match self {
            Lightbox::Open { context, index, .. } => context.get(*index).map(String::as_str),
            Lightbox::Closed => None,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Lightbox::Open { index, .. } => Some(*index),
            Lightbox::Closed => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Lightbox::Open { context, .. } => context.len(),
            Lightbox::Closed => 0,
        }
    }

    pub fn has_previous(&self) -> bool {
        matches!(self, Lightbox::Open { index, .. } if *index > 0)
    }

    pub fn has_next(&self) -> bool {
        matches!(self, Lightbox::Open { context, index, .. } if *index + 1 < context.len())
    }

    /// Step back one image. Returns the new image, or `None` at the start.
    pub fn previous(&mut self) -> Option<&str> {
        match self {
            Lightbox::Open { context, index, .. } if *index > 0 => {
                *index -= 1;
                context.get(*index).map(String::as_str)
            }
            _ => None,
        }
    }

    /// Step forward one image. Returns the new image, or `None` at the end.
    pub fn next(&mut self) -> Option<&str> {
        match self {
            Lightbox::Open { context, index, .. } if *index + 1 < context.len() => {
                *index += 1;
                context.get(*index).map(String::as_str)
            }
            _ => None,
        }
    }

    pub fn close(&mut self) {
        *self = Lightbox::Closed;
    }
}
