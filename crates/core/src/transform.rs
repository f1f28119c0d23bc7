//! Function composition helpers and the text transformers built from them.

/// A boxed unary function, the unit that [`compose`] and [`pipe`] chain together.
pub type Transform<T> = Box<dyn Fn(T) -> T>;

/// 由右至左套用函式。 / Builds a function applying `fns` right to left.
///
/// With no functions the result is the identity.
pub fn compose<T>(fns: Vec<Transform<T>>) -> impl Fn(T) -> T {
    move |initial| fns.iter().rev().fold(initial, |value, f| f(value))
}

/// 由左至右套用函式。 / Builds a function applying `fns` left to right.
///
/// With no functions the result is the identity.
pub fn pipe<T>(fns: Vec<Transform<T>>) -> impl Fn(T) -> T {
    move |initial| fns.iter().fold(initial, |value, f| f(value))
}

/// `compose!(f, g, h)(x) == f(g(h(x)))`.
#[macro_export]
macro_rules! compose {
    ($($f:expr),* $(,)?) => {
        $crate::transform::compose(vec![$(Box::new($f) as $crate::transform::Transform<_>),*])
    };
}

/// `pipe!(f, g, h)(x) == h(g(f(x)))`.
#[macro_export]
macro_rules! pipe {
    ($($f:expr),* $(,)?) => {
        $crate::transform::pipe(vec![$(Box::new($f) as $crate::transform::Transform<_>),*])
    };
}

/// Wraps a string transformation so that empty input maps to an empty string.
pub fn text_transformer<F>(f: F) -> impl Fn(&str) -> String
where
    F: Fn(&str) -> String,
{
    move |text| {
        if text.is_empty() {
            String::new()
        } else {
            f(text)
        }
    }
}

pub fn uppercase(text: &str) -> String {
    text_transformer(str::to_uppercase)(text)
}

pub fn lowercase(text: &str) -> String {
    text_transformer(str::to_lowercase)(text)
}

/// Uppercases the first char of each whitespace-delimited token.
///
/// Tokens are re-joined with a single space, so runs of whitespace collapse.
pub fn capitalize(text: &str) -> String {
    text_transformer(|text| {
        text.split_whitespace()
            .map(capitalize_token)
            .collect::<Vec<_>>()
            .join(" ")
    })(text)
}

fn capitalize_token(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Trims, collapses whitespace and capitalizes each word.
pub fn format_text(text: &str) -> String {
    let formatter = pipe![
        |text: String| text.trim().to_string(),
        |text: String| text.split_whitespace().collect::<Vec<_>>().join(" "),
        |text: String| capitalize(&text),
    ];
    formatter(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_one(x: i64) -> i64 {
        x + 1
    }

    fn double(x: i64) -> i64 {
        x * 2
    }

    #[test]
    fn compose_applies_right_to_left() {
        let composed = crate::compose!(add_one, double);
        assert_eq!(composed(5), add_one(double(5)));
    }

    #[test]
    fn pipe_applies_left_to_right() {
        let piped = crate::pipe!(add_one, double);
        assert_eq!(piped(5), double(add_one(5)));
    }

    #[test]
    fn empty_pipelines_are_identity() {
        let composed = compose::<i64>(Vec::new());
        let piped = pipe::<String>(Vec::new());
        assert_eq!(composed(42), 42);
        assert_eq!(piped("same".to_string()), "same");
    }

    #[test]
    fn case_transformers_preserve_spacing() {
        assert_eq!(uppercase("the  quick\tfox"), "THE  QUICK\tFOX");
        assert_eq!(lowercase("The  QUICK Fox"), "the  quick fox");
        assert_eq!(uppercase(""), "");
    }

    #[test]
    fn capitalize_collapses_whitespace() {
        assert_eq!(capitalize("the quick  fox"), "The Quick Fox");
        assert_eq!(capitalize("already Upper mIXed"), "Already Upper MIXed");
        assert_eq!(capitalize("élan vital"), "Élan Vital");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn format_text_trims_and_capitalizes() {
        assert_eq!(format_text("  hello   there\n world  "), "Hello There World");
        assert_eq!(format_text("   "), "");
    }

    #[test]
    fn transformers_compose_with_pipe() {
        let shout = crate::pipe!(|s: String| format_text(&s), |s: String| uppercase(&s));
        assert_eq!(shout(" make   noise ".to_string()), "MAKE NOISE");
    }
}
