/// Fixed starting board, used when nothing has been persisted yet.
use crate::types::{Board, Card, Category, ColumnId, Level};

fn milestone(
    id: &str,
    title: &str,
    category: Category,
    level: Level,
    description: &str,
    resources: &[&str],
    portfolio: &str,
) -> Card {
    Card {
        id: id.to_string(),
        title: title.to_string(),
        category,
        level,
        description: Some(description.to_string()),
        resources: Some(resources.iter().map(|r| r.to_string()).collect()),
        portfolio: Some(portfolio.to_string()),
    }
}

fn milestones() -> Vec<Card> {
    vec![
        milestone(
            "m1-acc",
            "Learn WCAG 2.1 & ARIA Roles",
            Category::CoreWebTech,
            Level::Advanced,
            "Semantic HTML, keyboard navigation, live regions.",
            &["https://www.w3.org/WAI/standards-guidelines/wcag/"],
            "Accessible components with Storybook docs",
        ),
        milestone(
            "m1-css-arch",
            "Master CSS Architecture",
            Category::CoreWebTech,
            Level::Advanced,
            "BEM, SMACSS, utility-first, Grid/Flexbox.",
            &["https://getbem.com/", "https://smacss.com/"],
            "Design tokens + theming",
        ),
        milestone(
            "m3-react",
            "React 18 Concurrency Deep Dive",
            Category::FrameworkMastery,
            Level::Advanced,
            "useTransition, Suspense, useDeferredValue.",
            &["https://react.dev/learn"],
            "Next.js dashboard with lazy-loaded charts",
        ),
        milestone(
            "m4-state",
            "State Management at Scale",
            Category::StateAndDataManagement,
            Level::Advanced,
            "Redux Toolkit, TanStack Query, Zustand.",
            &["https://redux-toolkit.js.org/", "https://tanstack.com/query/latest"],
            "Offline mode + optimistic updates",
        ),
        milestone(
            "m5-mfe",
            "Microfrontends & Shared Libraries",
            Category::UiArchitecture,
            Level::Advanced,
            "Module Federation, Single-SPA, versioned UI kits.",
            &["https://module-federation.github.io/"],
            "E-commerce MFE with Product/Cart/Checkout",
        ),
        milestone(
            "m6-perf",
            "Core Web Vitals & Security",
            Category::PerformanceAndSecurity,
            Level::Architect,
            "LCP/INP/CLS, Lighthouse, CSP, XSS prevention.",
            &["https://web.dev/vitals/"],
            "Bundle splitting + secure auth",
        ),
        milestone(
            "m7-lead",
            "Leadership & Governance",
            Category::LeadershipAndGovernance,
            Level::Advanced,
            "PR review strategy, UI guidelines, mentoring.",
            &[],
            "UI Architecture Playbook",
        ),
        milestone(
            "m8-ci",
            "Monorepo Tooling & CI/CD",
            Category::ToolingAndCiCd,
            Level::Architect,
            "Nx/Turborepo, pnpm, multi-app pipelines.",
            &["https://nx.dev/"],
            "Monorepo CI/CD pipeline",
        ),
        milestone(
            "m9-portfolio",
            "Strategic Portfolio & Presentation",
            Category::LeadershipAndGovernance,
            Level::Architect,
            "Case studies, recorded architecture talk.",
            &[],
            "Portfolio site with projects & blog",
        ),
    ]
}

/// All milestones start in the backlog, in declaration order.
pub fn seed_board() -> Board {
    let mut board = Board::empty();
    for card in milestones() {
        if let Some(backlog) = board.column_mut(ColumnId::Backlog) {
            backlog.item_ids.push(card.id.clone());
        }
        board.items.insert(card.id.clone(), card);
    }
    board
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_consistent() {
        let board = seed_board();
        assert!(board.check_integrity().is_ok());
        assert_eq!(board.items.len(), 9);
        assert_eq!(board.version, 0);
    }

    #[test]
    fn test_seed_layout() {
        let board = seed_board();
        let backlog = board.column(ColumnId::Backlog).unwrap();
        assert_eq!(backlog.item_ids.first().map(String::as_str), Some("m1-acc"));
        assert_eq!(backlog.item_ids.last().map(String::as_str), Some("m9-portfolio"));
        assert!(board.column(ColumnId::InProgress).unwrap().item_ids.is_empty());
        assert!(board.column(ColumnId::Done).unwrap().item_ids.is_empty());
        assert_eq!(board.column_order, ColumnId::ALL.to_vec());
    }
}
