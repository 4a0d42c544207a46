use super::LargeObject;
use crate::Result;

use std::borrow::Cow;

/// Describes the target database: its storage types, how large a LOB value
/// may be while still written inline, and how identifiers are delimited.
#[derive(Debug, Clone)]
pub struct Dictionary {
    /// Short name of the database, used in diagnostics.
    pub name: &'static str,

    /// Column storage types supported by the database
    pub storage_types: StorageTypes,

    /// Largest byte array written inline into a row. `None` when the database
    /// places no limit on inline binary values.
    pub max_embedded_blob_size: Option<u64>,

    /// Largest string written inline into a row. `None` when the database
    /// places no limit on inline character values.
    pub max_embedded_clob_size: Option<u64>,

    /// Opening and closing delimiters for identifiers. `None` leaves
    /// identifiers undelimited.
    pub identifier_delimiters: Option<(char, char)>,

    /// Size of each write when streaming into a large-object handle.
    pub lob_chunk_size: usize,
}

#[derive(Debug, Clone)]
pub struct StorageTypes {
    /// When `Some` the database supports varchar types with the specified
    /// upper limit.
    pub varchar: Option<u64>,

    /// When `Some` the database supports varbinary types with the specified
    /// upper limit.
    pub varbinary: Option<u64>,
}

impl Dictionary {
    /// A database with no inline LOB limits and undelimited identifiers.
    pub const GENERIC: Self = Self {
        name: "generic",
        storage_types: StorageTypes::GENERIC,
        max_embedded_blob_size: None,
        max_embedded_clob_size: None,
        identifier_delimiters: None,
        lob_chunk_size: 64 * 1024,
    };

    /// PostgreSQL
    pub const POSTGRESQL: Self = Self {
        name: "postgresql",
        storage_types: StorageTypes::POSTGRESQL,
        identifier_delimiters: Some(('"', '"')),
        ..Self::GENERIC
    };

    /// MySQL
    pub const MYSQL: Self = Self {
        name: "mysql",
        storage_types: StorageTypes::MYSQL,
        identifier_delimiters: Some(('`', '`')),
        ..Self::GENERIC
    };

    /// Oracle. Inline `VARCHAR2`/`RAW` values top out at 4000 bytes; larger
    /// values must be streamed into a LOB locator.
    pub const ORACLE: Self = Self {
        name: "oracle",
        storage_types: StorageTypes::ORACLE,
        max_embedded_blob_size: Some(4000),
        max_embedded_clob_size: Some(4000),
        identifier_delimiters: Some(('"', '"')),
        lob_chunk_size: 32 * 1024,
    };

    /// SQLite
    pub const SQLITE: Self = Self {
        name: "sqlite",
        storage_types: StorageTypes::SQLITE,
        identifier_delimiters: Some(('"', '"')),
        ..Self::GENERIC
    };

    /// Delimits `name` per this database's identifier policy.
    pub fn quote<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self.identifier_delimiters {
            Some((open, close)) => {
                let escaped = name.replace(close, &format!("{close}{close}"));
                Cow::Owned(format!("{open}{escaped}{close}"))
            }
            None => Cow::Borrowed(name),
        }
    }

    /// Replaces the content of a large-object handle with `bytes`.
    pub async fn put_bytes(&self, lob: &mut dyn LargeObject, bytes: &[u8]) -> Result<()> {
        lob.truncate().await?;

        let mut offset = 0;
        for chunk in bytes.chunks(self.lob_chunk_size.max(1)) {
            lob.write_bytes(offset, chunk).await?;
            offset += chunk.len() as u64;
        }

        Ok(())
    }

    /// Replaces the content of a character large-object handle with `text`.
    ///
    /// Chunks never split a character; offsets count characters.
    pub async fn put_string(&self, lob: &mut dyn LargeObject, text: &str) -> Result<()> {
        lob.truncate().await?;

        let chunk_size = self.lob_chunk_size.max(1);
        let mut offset = 0;
        let mut rest = text;

        while !rest.is_empty() {
            let split = rest
                .char_indices()
                .nth(chunk_size)
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            let (chunk, tail) = rest.split_at(split);

            lob.write_text(offset, chunk).await?;
            offset += chunk.chars().count() as u64;
            rest = tail;
        }

        Ok(())
    }
}

impl StorageTypes {
    pub const GENERIC: StorageTypes = StorageTypes {
        varchar: Some(u32::MAX as u64),
        varbinary: Some(u32::MAX as u64),
    };

    pub const POSTGRESQL: StorageTypes = StorageTypes {
        // The maximum n you can specify is 10 485 760 characters.
        varchar: Some(10_485_760),

        // `bytea` has no declared length.
        varbinary: None,
    };

    pub const MYSQL: StorageTypes = StorageTypes {
        varchar: Some(65_535),
        varbinary: Some(65_535),
    };

    pub const ORACLE: StorageTypes = StorageTypes {
        varchar: Some(4000),
        varbinary: Some(2000),
    };

    pub const SQLITE: StorageTypes = StorageTypes {
        // SQLite ignores the declared length; SQLITE_MAX_LENGTH is the only
        // hard limit.
        varchar: Some(1_000_000_000),
        varbinary: Some(1_000_000_000),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::async_trait;

    #[derive(Default)]
    struct Recorder {
        truncated: bool,
        writes: Vec<(u64, String)>,
    }

    #[async_trait]
    impl LargeObject for Recorder {
        async fn truncate(&mut self) -> Result<()> {
            self.truncated = true;
            Ok(())
        }

        async fn write_bytes(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
            self.writes
                .push((offset, String::from_utf8_lossy(bytes).into_owned()));
            Ok(())
        }

        async fn write_text(&mut self, offset: u64, text: &str) -> Result<()> {
            self.writes.push((offset, text.to_string()));
            Ok(())
        }
    }

    #[test]
    fn quote_per_dictionary() {
        assert_eq!(Dictionary::GENERIC.quote("version"), "version");
        assert_eq!(Dictionary::POSTGRESQL.quote("version"), "\"version\"");
        assert_eq!(Dictionary::MYSQL.quote("odd`name"), "`odd``name`");
    }

    #[tokio::test]
    async fn put_bytes_streams_in_chunks() {
        let dictionary = Dictionary {
            lob_chunk_size: 4,
            ..Dictionary::GENERIC
        };
        let mut lob = Recorder::default();

        dictionary
            .put_bytes(&mut lob, b"abcdefghij")
            .await
            .unwrap();

        assert!(lob.truncated);
        assert_eq!(
            lob.writes,
            vec![
                (0, "abcd".to_string()),
                (4, "efgh".to_string()),
                (8, "ij".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn put_string_counts_characters() {
        let dictionary = Dictionary {
            lob_chunk_size: 2,
            ..Dictionary::GENERIC
        };
        let mut lob = Recorder::default();

        dictionary.put_string(&mut lob, "héllo").await.unwrap();

        assert_eq!(
            lob.writes,
            vec![
                (0, "hé".to_string()),
                (2, "ll".to_string()),
                (4, "o".to_string())
            ]
        );
    }
}
