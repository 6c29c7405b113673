use crate::model::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
    Starred,
}

impl StatusFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "pending" => Some(Self::Pending),
            "completed" | "done" => Some(Self::Completed),
            "starred" => Some(Self::Starred),
            _ => None,
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
            Self::Starred => task.starred,
        }
    }
}

/// Derives a view of `tasks`: a case-insensitive substring match against title
/// or description (blank terms impose no restriction), intersected with the
/// status filter. Source order is kept; nothing is mutated.
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    search: Option<&str>,
    status: StatusFilter,
) -> Vec<&'a Task> {
    let term = search
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty());

    tasks
        .iter()
        .filter(|task| match term.as_deref() {
            Some(term) => {
                task.title.to_lowercase().contains(term)
                    || task.description.to_lowercase().contains(term)
            }
            None => true,
        })
        .filter(|task| status.matches(task))
        .collect()
}
