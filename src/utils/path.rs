use std::path::{Component, Path, PathBuf};

/// 低于该长度的路径不做缩写
pub const TRIM_THRESHOLD: usize = 60;

/// 缩写路径，仅用于日志显示，不能作为真实的 IO 路径
///
/// 例如 `/usr/local/bin/.../foo` 会变成 `/u/l/b/.../foo`，最后一段保持不变。
pub fn trim_path(p: &str) -> String {
    if p.len() < TRIM_THRESHOLD {
        return p.to_string();
    }

    let cleaned = clean(Path::new(p));
    let components: Vec<Component> = cleaned.components().collect();
    let last = components.len().saturating_sub(1);

    let mut trimmed = PathBuf::new();
    for (i, component) in components.iter().enumerate() {
        match component {
            Component::Normal(part) if i != last => {
                let first: String = part.to_string_lossy().chars().take(1).collect();
                // `.config` 之类缩成 `.` 后等同于当前目录，直接省略
                if first != "." {
                    trimmed.push(first);
                }
            }
            other => trimmed.push(other.as_os_str()),
        }
    }
    trimmed.to_string_lossy().into_owned()
}

/// 纯字面的路径规整：去掉 `.`、多余的分隔符，并消解 `..`
fn clean(p: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in p.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                // 根目录之上没有父目录
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            _ => parts.push(component),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().map(|c| c.as_os_str()).collect()
}
