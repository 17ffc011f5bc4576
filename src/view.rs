pub const DEFAULT_VIEW: &str = "daily";
pub const DEFAULT_PATH: &str = "/planner";
pub const VIEW_PARAM: &str = "view";

/// A navigation location: a path plus an optional query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: String,
}

impl Location {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.split('#').next().unwrap_or("");
        match raw.split_once('?') {
            Some((path, query)) => Location {
                path: path.to_string(),
                query: query.to_string(),
            },
            None => Location {
                path: raw.to_string(),
                query: String::new(),
            },
        }
    }

    /// Same path, different `view` value. This is how switching views is
    /// expressed: a new location, loaded from scratch.
    pub fn with_view(path: &str, view: &str) -> Self {
        Location {
            path: path.to_string(),
            query: format!("{}={}", VIEW_PARAM, encode_component(view)),
        }
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
            .find(|(key, _)| decode_component(key) == name)
            .map(|(_, value)| decode_component(value))
    }
}

impl Default for Location {
    fn default() -> Self {
        Location {
            path: DEFAULT_PATH.to_string(),
            query: String::new(),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.query.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}?{}", self.path, self.query)
        }
    }
}

pub fn resolve_view(location: &Location) -> String {
    match location.query_param(VIEW_PARAM) {
        Some(view) if !view.is_empty() => view,
        _ => DEFAULT_VIEW.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub view: String,
    pub label: String,
    pub active: bool,
}

/// The row of view links shown above the grid.
#[derive(Debug, Clone)]
pub struct NavBar {
    pub links: Vec<NavLink>,
}

impl NavBar {
    pub fn standard() -> Self {
        NavBar {
            links: [("daily", "Daily"), ("weekly", "Weekly"), ("monthly", "Monthly")]
                .into_iter()
                .map(|(view, label)| NavLink {
                    view: view.into(),
                    label: label.into(),
                    active: false,
                })
                .collect(),
        }
    }

    pub fn mark_active(&mut self, view: &str) {
        for link in &mut self.links {
            link.active = link.view == view;
        }
    }

    pub fn active(&self) -> Option<&NavLink> {
        self.links.iter().find(|l| l.active)
    }

    pub fn view_at(&self, idx: usize) -> Option<&str> {
        self.links.get(idx).map(|l| l.view.as_str())
    }
}

fn decode_component(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hi = (bytes[i + 1] as char).to_digit(16);
                let lo = (bytes[i + 2] as char).to_digit(16);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi * 16 + lo) as u8);
                        i += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}
