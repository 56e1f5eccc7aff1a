use crate::evaluation::EvaluationStats;

/// A scholarly note attached to one or more elements of the play.
///
/// `target` holds the raw references as written (`#v12`, `#seg-3`); use
/// [`Annotation::targets`] for the bare ids.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Annotation {
    #[cfg_attr(feature = "json", serde(alias = "nota_id"))]
    pub id: String,
    #[cfg_attr(feature = "json", serde(default, deserialize_with = "de::target"))]
    pub target: Vec<String>,
    #[cfg_attr(
        feature = "json",
        serde(default, deserialize_with = "de::version", skip_serializing_if = "Option::is_none")
    )]
    pub version: Option<String>,
    #[cfg_attr(
        feature = "json",
        serde(rename = "type", default, skip_serializing_if = "Option::is_none")
    )]
    pub kind: Option<String>,
    #[cfg_attr(feature = "json", serde(default, skip_serializing_if = "Option::is_none"))]
    pub subtype: Option<String>,
    #[cfg_attr(feature = "json", serde(alias = "texto_nota", default))]
    pub text: String,
    /// Display number.
    #[cfg_attr(
        feature = "json",
        serde(default, deserialize_with = "de::version", skip_serializing_if = "Option::is_none")
    )]
    pub n: Option<String>,
    #[cfg_attr(
        feature = "json",
        serde(alias = "evaluaciones", default, skip_serializing_if = "Option::is_none")
    )]
    pub evaluations: Option<EvaluationStats>,
}

impl Annotation {
    /// Note targeting a whitespace-separated list of references.
    pub fn new(id: impl Into<String>, target: &str) -> Self {
        Self {
            id: id.into(),
            target: target.split_whitespace().map(str::to_string).collect(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_n(mut self, n: impl Into<String>) -> Self {
        self.n = Some(n.into());
        self
    }

    /// Target ids with the leading `#` removed. Empty references are skipped.
    pub fn targets(&self) -> impl Iterator<Item = &str> + '_ {
        self.target
            .iter()
            .flat_map(|raw| raw.split_whitespace())
            .map(|t| t.strip_prefix('#').unwrap_or(t))
            .filter(|t| !t.is_empty())
    }

    pub fn target_count(&self) -> usize {
        self.targets().count()
    }

    /// True when any target contains `marker` (`seg-` for sub-line segments).
    pub fn is_segment_level(&self, marker: &str) -> bool {
        self.targets().any(|t| t.contains(marker))
    }
}

#[cfg(feature = "json")]
mod de {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Number(serde_json::Number),
    }

    /// `"#v1 #v2"` or `["#v1", "#v2"]`.
    pub fn target<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
            Some(OneOrMany::One(s)) => s.split_whitespace().map(str::to_string).collect(),
            Some(OneOrMany::Many(list)) => list,
            None => Vec::new(),
        })
    }

    /// A string or a number, kept as text.
    pub fn version<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Scalar>::deserialize(deserializer)?.map(|v| match v {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
        }))
    }
}
