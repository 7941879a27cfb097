//! Token sets with O(1) membership.
//!
//! Each bit of the `u128` corresponds to a `TokenKind` discriminant.

use caret_ir::TokenKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct TokenSet(u128);

impl TokenSet {
    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn single(kind: TokenKind) -> Self {
        Self(1u128 << kind.index())
    }

    #[inline]
    #[must_use]
    pub const fn with(self, kind: TokenKind) -> Self {
        Self(self.0 | (1u128 << kind.index()))
    }

    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(&self, kind: TokenKind) -> bool {
        (self.0 & (1u128 << kind.index())) != 0
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Kinds in this set, in discriminant order.
    pub fn iter(&self) -> impl Iterator<Item = TokenKind> + '_ {
        TokenKind::ALL.iter().copied().filter(|k| self.contains(*k))
    }

    /// "`a`, `b`, or `c`" for error messages.
    pub fn format_expected(&self) -> String {
        let names: Vec<&'static str> = self.iter().map(TokenKind::display_name).collect();
        match names.as_slice() {
            [] => "nothing".to_string(),
            [single] => format!("`{single}`"),
            [first, second] => format!("`{first}` or `{second}`"),
            [rest @ .., last] => {
                let rest_str = rest
                    .iter()
                    .map(|n| format!("`{n}`"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{rest_str}, or `{last}`")
            }
        }
    }
}

/// Keywords that can open a declaration as a modifier.
pub const MODIFIERS: TokenSet = TokenSet::new()
    .with(TokenKind::Public)
    .with(TokenKind::Protected)
    .with(TokenKind::Private)
    .with(TokenKind::Static)
    .with(TokenKind::Abstract)
    .with(TokenKind::Final)
    .with(TokenKind::Native)
    .with(TokenKind::Synchronized)
    .with(TokenKind::Transient)
    .with(TokenKind::Volatile)
    .with(TokenKind::Strictfp)
    .with(TokenKind::Default);

pub const PRIMITIVE_TYPES: TokenSet = TokenSet::new()
    .with(TokenKind::Boolean)
    .with(TokenKind::Byte)
    .with(TokenKind::Char)
    .with(TokenKind::Short)
    .with(TokenKind::Int)
    .with(TokenKind::Long)
    .with(TokenKind::Float)
    .with(TokenKind::Double);

/// Keywords that open a type declaration.
pub const TYPE_DECL_START: TokenSet = TokenSet::new()
    .with(TokenKind::Class)
    .with(TokenKind::Interface)
    .with(TokenKind::Enum);

/// Tokens after `)` that make a parenthesized type a cast.
pub const CAST_FOLLOW: TokenSet = TokenSet::new()
    .with(TokenKind::Ident)
    .with(TokenKind::IntLit)
    .with(TokenKind::LongLit)
    .with(TokenKind::FloatLit)
    .with(TokenKind::DoubleLit)
    .with(TokenKind::CharLit)
    .with(TokenKind::StringLit)
    .with(TokenKind::TextBlock)
    .with(TokenKind::True)
    .with(TokenKind::False)
    .with(TokenKind::Null)
    .with(TokenKind::This)
    .with(TokenKind::Super)
    .with(TokenKind::New)
    .with(TokenKind::LParen)
    .with(TokenKind::Bang)
    .with(TokenKind::Tilde);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_token_set_empty() {
        let set = TokenSet::new();
        assert!(set.is_empty());
        assert_eq!(set.count(), 0);
        assert!(!set.contains(TokenKind::At));
    }

    #[test]
    fn test_token_set_covers_last_kind() {
        let set = TokenSet::single(TokenKind::Eof).with(TokenKind::Ident);
        assert!(set.contains(TokenKind::Eof));
        assert!(set.contains(TokenKind::Ident));
        assert_eq!(set.count(), 2);
    }

    #[test]
    fn test_format_expected() {
        assert_eq!(TokenSet::new().format_expected(), "nothing");
        assert_eq!(
            TokenSet::single(TokenKind::Semicolon).format_expected(),
            "`;`"
        );
        assert_eq!(
            TokenSet::new()
                .with(TokenKind::Ident)
                .with(TokenKind::LBrace)
                .with(TokenKind::Semicolon)
                .format_expected(),
            "`identifier`, `{`, or `;`"
        );
    }

    #[test]
    fn test_modifier_set_matches_kind_predicate() {
        for kind in TokenKind::ALL {
            assert_eq!(MODIFIERS.contains(kind), kind.is_modifier(), "{kind:?}");
        }
    }
}
