//! Instruction template sent to the generation service.

use chrono::NaiveDate;

const TEMPLATE: &str = r#"Act as a Staff Engineer writing for a technical blog.
First decide the technical topic of the question below (for example Networking, Databases, Distributed Systems) and a narrower subcategory.
Write a technical article answering: "{question}"

Return only the article as Markdown, structured strictly like this:

---
layout: post
title: "Daily Learning: {title}"
date: {date}
categories: [<Category>, <Subcategory>]
tags: [<3 to 6 tags, all lowercase>]
---

# The Question: {question}

## 1. Key Concepts
(Explain the concept simply)

## 2. Analogy or Case Study
(A short real-world story or analogy)

## 3. Technical Trade-offs
(Bottlenecks, what goes wrong, and how to resolve it)

## 4. Real-World Usage
(Technologies and companies that use it, and what to learn next)
"#;

/// Render the instruction for one question.
///
/// The front matter title is a double-quoted YAML string, so quotes and
/// backslashes in the question are escaped there.
pub fn render_prompt(question: &str, date: NaiveDate) -> String {
    let question = question.trim();
    let title = question.replace('\\', "\\\\").replace('"', "\\\"");
    let date = date.format("%Y-%m-%d").to_string();
    fill(
        TEMPLATE,
        &[
            ("{title}", title.as_str()),
            ("{date}", date.as_str()),
            ("{question}", question),
        ],
    )
}

/// Substitute placeholders in one pass; inserted text is never rescanned.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
