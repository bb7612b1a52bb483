//! The fixed menu of labels a user can pick from, and their English phrases.

use serde::Serialize;

/// The three groups labels are sorted into.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelGroup {
    /// Rendering style, eg. watercolour
    Style,
    /// What's in the picture
    Subject,
    /// Colour treatment
    Color,
}

impl LabelGroup {
    /// All groups, in display order.
    pub const ALL: [LabelGroup; 3] = [LabelGroup::Style, LabelGroup::Subject, LabelGroup::Color];

    /// Heading shown above the group in the UI.
    pub fn title(self) -> &'static str {
        match self {
            LabelGroup::Style => "风格类",
            LabelGroup::Subject => "主题类",
            LabelGroup::Color => "色彩类",
        }
    }
}

impl std::fmt::Display for LabelGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// One selectable menu entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Label {
    /// Identifier, which is also the text shown to the user.
    pub id: &'static str,
    /// Canonical English phrase used in prompts.
    pub phrase: &'static str,
    /// Which group this label belongs to.
    pub group: LabelGroup,
}

const fn label(id: &'static str, phrase: &'static str, group: LabelGroup) -> Label {
    Label { id, phrase, group }
}

static LABELS: [Label; 15] = [
    label("写实风格", "realistic style", LabelGroup::Style),
    label("卡通风格", "cartoon style", LabelGroup::Style),
    label("水彩画风格", "watercolor painting style", LabelGroup::Style),
    label("油画风格", "oil painting style", LabelGroup::Style),
    label("像素艺术风格", "pixel art style", LabelGroup::Style),
    label("自然风景", "natural landscape", LabelGroup::Subject),
    label("城市建筑", "urban architecture", LabelGroup::Subject),
    label("人物肖像", "portrait", LabelGroup::Subject),
    label("动物世界", "wildlife", LabelGroup::Subject),
    label("科幻场景", "sci-fi scene", LabelGroup::Subject),
    label("暖色调", "warm color palette", LabelGroup::Color),
    label("冷色调", "cool color palette", LabelGroup::Color),
    label("黑白色调", "black and white", LabelGroup::Color),
    label("彩虹色彩", "rainbow colors", LabelGroup::Color),
    label("夜晚色调", "night time atmosphere", LabelGroup::Color),
];

/// Every label, flattened in display order.
pub fn labels() -> &'static [Label] {
    &LABELS
}

/// Labels belonging to `group`, in display order.
pub fn group_labels(group: LabelGroup) -> impl Iterator<Item = &'static Label> {
    LABELS.iter().filter(move |label| label.group == group)
}

/// Groups paired with their labels, in display order.
pub fn groups() -> Vec<(LabelGroup, Vec<&'static Label>)> {
    LabelGroup::ALL
        .iter()
        .map(|group| (*group, group_labels(*group).collect()))
        .collect()
}

/// Looks up a label by identifier.
pub fn find(id: &str) -> Option<&'static Label> {
    LABELS.iter().find(|label| label.id == id)
}

/// Returns true when `id` is part of the catalog.
pub fn contains(id: &str) -> bool {
    find(id).is_some()
}

/// English phrase for `id`.
///
/// Unknown labels come back unchanged rather than as an error, so an
/// untranslated label ends up verbatim in the prompt.
pub fn translate(id: &str) -> &str {
    match find(id) {
        Some(label) => label.phrase,
        None => id,
    }
}
