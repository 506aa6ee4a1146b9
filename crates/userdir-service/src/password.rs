//! Credential hashing using Argon2id.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use userdir_core::error::{DirectoryError, DirectoryResult};

fn peppered<'a>(password: &'a str, pepper: Option<&str>, buf: &'a mut String) -> &'a [u8] {
    match pepper {
        Some(p) => {
            *buf = format!("{p}{password}");
            buf.as_bytes()
        }
        None => password.as_bytes(),
    }
}

/// Hash a credential with Argon2id (m=19 MiB, t=2, p=1) and a random salt.
pub fn hash_password(password: &str, pepper: Option<&str>) -> DirectoryResult<String> {
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DirectoryError::Crypto(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut buf = String::new();
    let input = peppered(password, pepper, &mut buf);

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| DirectoryError::Crypto(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}
