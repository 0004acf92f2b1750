/// Case-insensitive keyword set used to admit feed entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    folded: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let folded = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { folded }
    }

    pub fn len(&self) -> usize {
        self.folded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    /// True iff any keyword occurs in the title, ignoring case.
    pub fn matches(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.folded.iter().any(|k| title.contains(k.as_str()))
    }
}

/// True iff any keyword (case-folded) is a substring of the case-folded title.
pub fn is_relevant<S: AsRef<str>>(title: &str, keywords: &[S]) -> bool {
    let title = title.to_lowercase();
    keywords.iter().any(|k| {
        let k = k.as_ref().trim().to_lowercase();
        !k.is_empty() && title.contains(&k)
    })
}
