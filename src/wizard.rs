/// Linear creation flow shared by tenders and proposals:
/// Info -> FileUpload -> ReviewAndPublish. Back-navigation is allowed;
/// publishing is terminal and just resets, since nothing persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Info,
    FileUpload,
    ReviewAndPublish,
}

impl WizardStep {
    pub fn first() -> Self {
        WizardStep::Info
    }

    pub fn next(self) -> Self {
        match self {
            WizardStep::Info => WizardStep::FileUpload,
            WizardStep::FileUpload => WizardStep::ReviewAndPublish,
            WizardStep::ReviewAndPublish => WizardStep::ReviewAndPublish,
        }
    }

    #[allow(dead_code)] // back-navigation has no CLI surface yet
    pub fn back(self) -> Self {
        match self {
            WizardStep::Info => WizardStep::Info,
            WizardStep::FileUpload => WizardStep::Info,
            WizardStep::ReviewAndPublish => WizardStep::FileUpload,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == WizardStep::ReviewAndPublish
    }

    pub fn label(self) -> &'static str {
        match self {
            WizardStep::Info => "Details",
            WizardStep::FileUpload => "Documents",
            WizardStep::ReviewAndPublish => "Review & publish",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_walk_reaches_terminal() {
        let mut step = WizardStep::first();
        assert!(!step.is_terminal());
        step = step.next();
        assert_eq!(step, WizardStep::FileUpload);
        step = step.next();
        assert!(step.is_terminal());
        // next() on the last step stays put
        assert_eq!(step.next(), WizardStep::ReviewAndPublish);
    }

    #[test]
    fn test_back_navigation() {
        assert_eq!(WizardStep::ReviewAndPublish.back(), WizardStep::FileUpload);
        assert_eq!(WizardStep::FileUpload.back(), WizardStep::Info);
        // back() on the first step stays put
        assert_eq!(WizardStep::Info.back(), WizardStep::Info);
    }
}
