//! Canned documents shared by the crate and integration suites.

/// Body of a rules document targeting decision records. It yields:
///
/// - a front-matter rule requiring `title`, `status` and `owner`
/// - a section rule requiring Context, Decision and Consequences
/// - a word-minimum content rule (20 words) and an inactive "should" rule
/// - a negative pattern rule forbidding `TODO`
pub const DECISION_RULES_BODY: &str = "\
# Decision Records

## Frontmatter Requirements

```yaml
title: Short imperative summary
status: proposed
owner: owning team
```

## Required Sections

- Context
- Decision
- Consequences

## Content Rules

- Must contain at least 20 words
- Should reference related decisions

## Must Not Contain Placeholders

```regex
TODO
```
";

/// A decision record that satisfies every rule in [`DECISION_RULES_BODY`].
pub const VALID_DECISION: &str = "\
---
title: Adopt structured logging
status: accepted
owner: platform
---

# Adopt structured logging

## Context

Log lines are free text today and cannot be queried by field.

## Decision

Emit structured events through a single subscriber for every service.

## Consequences

Dashboards can filter by field and alerting rules become simpler to write.
";

/// Missing `owner` and `status`, the Consequences section, and containing a
/// `TODO` on line 10.
pub const FLAWED_DECISION: &str = "\
---
title: Pick a queue
---

# Pick a queue

## Context

Several teams need durable background jobs with retries and visibility.
TODO compare brokers

## Decision

Use the managed queue offered by our cloud provider for all new jobs.
";
