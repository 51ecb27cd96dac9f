use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Tab and sidebar state for one page, handed to child components instead
/// of living in globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState<T: Copy + Eq + Debug> {
    tabs: Vec<T>,
    active: T,
    pub sidebar_collapsed: bool,
}

impl<T: Copy + Eq + Debug> PageState<T> {
    /// The first tab is active initially.
    pub fn new(tabs: &[T]) -> CoreResult<Self> {
        let active = *tabs
            .first()
            .ok_or_else(|| CoreError::InvalidInput("a page needs at least one tab".to_string()))?;
        Ok(Self {
            tabs: tabs.to_vec(),
            active,
            sidebar_collapsed: false,
        })
    }

    pub fn tabs(&self) -> &[T] {
        &self.tabs
    }

    pub fn active_tab(&self) -> T {
        self.active
    }

    pub fn set_active_tab(&mut self, tab: T) -> CoreResult<()> {
        if !self.tabs.contains(&tab) {
            return Err(CoreError::InvalidInput(format!("tab {:?} is not on this page", tab)));
        }
        self.active = tab;
        Ok(())
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_collapsed = !self.sidebar_collapsed;
        self.sidebar_collapsed
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CaseDetailsTab {
    Overview,
    Evidence,
    AiAnalysis,
    Timeline,
    Collaboration,
}

impl CaseDetailsTab {
    pub const ALL: [CaseDetailsTab; 5] = [
        CaseDetailsTab::Overview,
        CaseDetailsTab::Evidence,
        CaseDetailsTab::AiAnalysis,
        CaseDetailsTab::Timeline,
        CaseDetailsTab::Collaboration,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdminTab {
    Users,
    Security,
    Performance,
    Config,
}

impl AdminTab {
    pub const ALL: [AdminTab; 4] = [
        AdminTab::Users,
        AdminTab::Security,
        AdminTab::Performance,
        AdminTab::Config,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_do_not_share_state() {
        let mut a = PageState::new(&CaseDetailsTab::ALL).unwrap();
        let b = PageState::new(&CaseDetailsTab::ALL).unwrap();
        a.set_active_tab(CaseDetailsTab::Evidence).unwrap();
        assert!(a.toggle_sidebar());
        assert_eq!(b.active_tab(), CaseDetailsTab::Overview);
        assert!(!b.sidebar_collapsed);
    }

    #[test]
    fn rejects_tabs_outside_the_page() {
        let mut p = PageState::new(&[AdminTab::Users, AdminTab::Security]).unwrap();
        assert!(p.set_active_tab(AdminTab::Config).is_err());
        assert_eq!(p.active_tab(), AdminTab::Users);
        assert!(PageState::<AdminTab>::new(&[]).is_err());
    }
}
