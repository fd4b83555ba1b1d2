//! Access decisions for repository resources.

use crate::error::{MavenError, MavenResult};
use crate::repository::Repository;
use depot_core::{AccessToken, Location};

/// Authorization rules over repositories and paths.
///
/// Public repositories allow anonymous reads and browsing. Private
/// repositories require a token whose routes cover `{repository}/{path}`
/// with at least read permission. Writes and deletes always require write
/// permission on the path.
#[derive(Default)]
pub struct RepositorySecurityProvider;

impl RepositorySecurityProvider {
    /// Whether the token may read the resource at `gav`.
    pub fn can_access_resource(
        &self,
        token: Option<&AccessToken>,
        repository: &Repository,
        gav: &Location,
    ) -> MavenResult<()> {
        if !repository.is_private() {
            return Ok(());
        }
        let route = self.route(repository, gav)?;
        match token {
            None => Err(MavenError::Unauthorized(format!(
                "repository {} requires authentication",
                repository.id
            ))),
            Some(token) if token.can_read(&route) => Ok(()),
            Some(token) => Err(MavenError::Forbidden(format!(
                "token {} has no read access to {route}",
                token.name
            ))),
        }
    }

    /// Whether the token may browse the directory at `gav`.
    pub fn can_browse_resource(
        &self,
        token: Option<&AccessToken>,
        repository: &Repository,
        gav: &Location,
    ) -> MavenResult<()> {
        self.can_access_resource(token, repository, gav)
    }

    /// Whether the token may write or delete the resource at `gav`.
    pub fn can_modify_resource(
        &self,
        token: Option<&AccessToken>,
        repository: &Repository,
        gav: &Location,
    ) -> MavenResult<()> {
        let route = self.route(repository, gav)?;
        match token {
            None => Err(MavenError::Unauthorized(
                "modification requires authentication".to_string(),
            )),
            Some(token) if token.can_write(&route) => Ok(()),
            Some(token) => Err(MavenError::Forbidden(format!(
                "token {} has no write access to {route}",
                token.name
            ))),
        }
    }

    fn route(&self, repository: &Repository, gav: &Location) -> MavenResult<Location> {
        Ok(Location::parse(&repository.id)?.join(gav.as_str())?)
    }
}
