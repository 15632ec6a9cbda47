//! Green bean list

/// Beans offered before the user has saved a list of their own
pub const DEFAULT_BEANS: &[&str] = &[
    "Ethiopia Yirgacheffe",
    "Colombia Supremo",
    "Kenya AA",
    "Brazil Santos",
    "Guatemala Antigua",
    "Costa Rica Tarrazu",
    "Indonesia Sumatra",
    "Panama Geisha",
];

pub fn default_bean_list() -> Vec<String> {
    DEFAULT_BEANS.iter().map(|b| b.to_string()).collect()
}

/// Origin guessed from a bean name: its first word ("Kenya AA" → "Kenya")
pub fn bean_origin(name: &str) -> Option<String> {
    name.split_whitespace().next().map(str::to_string)
}

/// Trim entries, drop blanks and duplicates, keep the first occurrence order
pub fn normalize_bean_list<I, S>(beans: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut list: Vec<String> = Vec::new();
    for bean in beans {
        let bean = bean.as_ref().trim();
        if !bean.is_empty() && !list.iter().any(|b| b == bean) {
            list.push(bean.to_string());
        }
    }
    list
}

/// Add a custom bean name. Returns the trimmed name, or `None` if it was blank.
///
/// The list is unchanged when the bean is already present.
pub fn add_bean(beans: &mut Vec<String>, name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    if !beans.iter().any(|b| b == name) {
        beans.push(name.to_string());
    }
    Some(name.to_string())
}
