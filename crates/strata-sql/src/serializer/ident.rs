use super::{Formatter, Params, ToSql};

pub(super) struct Ident<S>(pub(super) S);

/// Words that can't be used as a bare identifier in any supported flavor.
const RESERVED: &[&str] = &[
    "all", "and", "as", "by", "case", "check", "column", "constraint", "create", "default",
    "desc", "distinct", "drop", "else", "end", "exists", "from", "group", "having", "in",
    "index", "join", "key", "limit", "not", "null", "on", "or", "order", "primary",
    "references", "select", "table", "then", "to", "union", "unique", "user", "when", "where",
];

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let ident = self.0.as_ref();

        if !requires_quotes(ident) {
            f.dst.push_str(ident);
            return;
        }

        let quote = if f.serializer.is_mysql() { '`' } else { '"' };

        f.dst.push(quote);
        for c in ident.chars() {
            if c == quote {
                f.dst.push(quote);
            }
            f.dst.push(c);
        }
        f.dst.push(quote);
    }
}

/// Mixed-case names are case sensitive only when quoted, so anything other
/// than a lowercase, non-reserved word is quoted.
fn requires_quotes(ident: &str) -> bool {
    let mut chars = ident.chars();

    let Some(first) = chars.next() else {
        return true;
    };

    if !(first.is_ascii_lowercase() || first == '_') {
        return true;
    }

    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
        return true;
    }

    RESERVED.contains(&ident)
}

#[cfg(test)]
mod tests {
    use super::requires_quotes;

    #[test]
    fn quoting() {
        assert!(!requires_quotes("people"));
        assert!(!requires_quotes("primary_language"));
        assert!(!requires_quotes("type"));
        assert!(requires_quotes("documentType"));
        assert!(requires_quotes("user"));
        assert!(requires_quotes("1st"));
        assert!(requires_quotes(""));
    }
}
