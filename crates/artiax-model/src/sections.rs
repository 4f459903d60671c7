//! Non-particle content kept for write-back.

/// One section of a particle list file, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// Written back unchanged.
    Verbatim { id: String, text: String },
    /// The particle table. A writer regenerates it between `head` and `tail`.
    Particles { id: String, head: String, tail: String },
}

impl Section {
    pub fn id(&self) -> &str {
        match self {
            Section::Verbatim { id, .. } | Section::Particles { id, .. } => id,
        }
    }
}

/// Ordered sections of a file, keyed by their identifier in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuxSections {
    sections: Vec<Section>,
}

impl AuxSections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_verbatim(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.sections.push(Section::Verbatim {
            id: id.into(),
            text: text.into(),
        });
    }

    /// Records where the particle table sits. A second call replaces the first.
    pub fn push_particles(
        &mut self,
        id: impl Into<String>,
        head: impl Into<String>,
        tail: impl Into<String>,
    ) {
        self.sections.retain(|s| !matches!(s, Section::Particles { .. }));
        self.sections.push(Section::Particles {
            id: id.into(),
            head: head.into(),
            tail: tail.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn verbatim(&self, id: &str) -> Option<&str> {
        self.sections.iter().find_map(|s| match s {
            Section::Verbatim { id: sid, text } if sid == id => Some(text.as_str()),
            _ => None,
        })
    }

    /// Identifier of the particle table section, if the list came from a file.
    pub fn particle_section(&self) -> Option<&str> {
        self.sections.iter().find_map(|s| match s {
            Section::Particles { id, .. } => Some(id.as_str()),
            Section::Verbatim { .. } => None,
        })
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
