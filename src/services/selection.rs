//! Numbered menus: render choices and resolve the typed answer to an id.
//!
//! Menus are 1-indexed. The project menu also offers `0` for "no project".
//! A non-numeric or out-of-range answer is an error; there is no retry.

use crate::types::{Project, ProjectListing, Result, TglError, Workspace};

/// Parse a menu answer
fn parse_choice(input: &str) -> Result<usize> {
    input
        .trim()
        .parse::<usize>()
        .map_err(|_| TglError::SelectionNotANumber)
}

/// Pick `items[choice - 1]`
fn pick<T>(items: &[T], choice: usize) -> Result<&T> {
    choice
        .checked_sub(1)
        .and_then(|index| items.get(index))
        .ok_or(TglError::InvalidSelection)
}

pub fn workspace_menu(workspaces: &[Workspace]) -> Vec<String> {
    workspaces
        .iter()
        .enumerate()
        .map(|(i, w)| format!("{}: {}", i + 1, w.name))
        .collect()
}

pub fn resolve_workspace(workspaces: &[Workspace], input: &str) -> Result<String> {
    let choice = parse_choice(input)?;
    Ok(pick(workspaces, choice)?.id.clone())
}

pub fn project_menu(projects: &[Project]) -> Vec<String> {
    let mut lines = vec![
        "0: Don't use any project".to_string(),
        "--------------------------".to_string(),
    ];
    lines.extend(
        projects
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}: {}", i + 1, p.name)),
    );
    lines
}

/// `0` means no project
pub fn resolve_project(projects: &[Project], input: &str) -> Result<Option<String>> {
    match parse_choice(input)? {
        0 => Ok(None),
        choice => Ok(Some(pick(projects, choice)?.id.clone())),
    }
}

/// Table of every project with its workspace, for deletion
pub fn listing_menu(listings: &[ProjectListing]) -> Vec<String> {
    let project_width = listings
        .iter()
        .map(|l| l.project_name.chars().count())
        .max()
        .unwrap_or(0)
        + 14;
    let workspace_width = listings
        .iter()
        .map(|l| l.workspace_name.chars().count())
        .max()
        .unwrap_or(0)
        + 2;

    let mut lines = vec![
        format!(
            "{:^pw$}  {:^ww$}",
            "PROJECT NAME",
            "WORKSPACE NAME",
            pw = project_width,
            ww = workspace_width
        ),
        "-".repeat(project_width + workspace_width),
    ];
    lines.extend(listings.iter().enumerate().map(|(i, l)| {
        format!(
            " {}: {:<pw$}{}",
            i + 1,
            l.project_name,
            l.workspace_name,
            pw = project_width
        )
    }));
    lines
}

pub fn resolve_listing(listings: &[ProjectListing], input: &str) -> Result<String> {
    let choice = parse_choice(input)?;
    Ok(pick(listings, choice)?.project_id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspaces() -> Vec<Workspace> {
        vec![
            Workspace {
                id: "1".to_string(),
                name: "Personal".to_string(),
            },
            Workspace {
                id: "2".to_string(),
                name: "Team".to_string(),
            },
        ]
    }

    fn projects() -> Vec<Project> {
        vec![
            Project {
                workspace_id: "1".to_string(),
                id: "10".to_string(),
                name: "Alpha".to_string(),
            },
            Project {
                workspace_id: "1".to_string(),
                id: "11".to_string(),
                name: "Beta".to_string(),
            },
        ]
    }

    #[test]
    fn test_workspace_menu_is_one_indexed() {
        assert_eq!(workspace_menu(&workspaces()), vec!["1: Personal", "2: Team"]);
    }

    #[test]
    fn test_resolve_workspace() {
        assert_eq!(resolve_workspace(&workspaces(), "2").unwrap(), "2");
        assert_eq!(resolve_workspace(&workspaces(), " 1\n").unwrap(), "1");
    }

    #[test]
    fn test_resolve_workspace_zero_is_invalid() {
        assert!(matches!(
            resolve_workspace(&workspaces(), "0"),
            Err(TglError::InvalidSelection)
        ));
    }

    #[test]
    fn test_resolve_workspace_out_of_range() {
        assert!(matches!(
            resolve_workspace(&workspaces(), "3"),
            Err(TglError::InvalidSelection)
        ));
    }

    #[test]
    fn test_resolve_non_numeric() {
        assert!(matches!(
            resolve_workspace(&workspaces(), "Team"),
            Err(TglError::SelectionNotANumber)
        ));
        assert!(matches!(
            resolve_project(&projects(), "-1"),
            Err(TglError::SelectionNotANumber)
        ));
    }

    #[test]
    fn test_project_menu_offers_no_project() {
        let menu = project_menu(&projects());
        assert_eq!(menu[0], "0: Don't use any project");
        assert_eq!(menu[2], "1: Alpha");
        assert_eq!(menu[3], "2: Beta");
    }

    #[test]
    fn test_resolve_project_zero_means_none() {
        assert_eq!(resolve_project(&projects(), "0").unwrap(), None);
        assert_eq!(
            resolve_project(&projects(), "2").unwrap().as_deref(),
            Some("11")
        );
        assert!(matches!(
            resolve_project(&projects(), "5"),
            Err(TglError::InvalidSelection)
        ));
    }

    #[test]
    fn test_listing_menu_and_resolution() {
        let listings = vec![
            ProjectListing {
                project_name: "Alpha".to_string(),
                workspace_name: "Personal".to_string(),
                project_id: "10".to_string(),
            },
            ProjectListing {
                project_name: "Gamma".to_string(),
                workspace_name: "Team".to_string(),
                project_id: "20".to_string(),
            },
        ];

        let menu = listing_menu(&listings);
        assert!(menu[0].contains("PROJECT NAME"));
        assert!(menu[0].contains("WORKSPACE NAME"));
        assert!(menu[2].starts_with(" 1: Alpha"));
        assert!(menu[3].ends_with("Team"));

        assert_eq!(resolve_listing(&listings, "2").unwrap(), "20");
        assert!(matches!(
            resolve_listing(&listings, "0"),
            Err(TglError::InvalidSelection)
        ));
    }
}
