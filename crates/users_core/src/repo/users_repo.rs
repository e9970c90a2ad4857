//! Users repository: typed pass-through over a `UserClient`.

use crate::client::UserClient;
use crate::model::user::{
    User, UserCreateInput, UserListQuery, UserOrderByInput, UserUpdateInput, UserWhereInput,
    UserWhereUniqueInput,
};
use crate::repo::RepoResult;

/// Arguments of [`UsersRepository::create_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserArgs {
    pub data: UserCreateInput,
}

/// Arguments of [`UsersRepository::get_users`].
///
/// Every field is optional; the default lists all users in `id` order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetUsersArgs {
    pub cursor: Option<UserWhereUniqueInput>,
    pub filter: Option<UserWhereInput>,
    pub order_by: Vec<UserOrderByInput>,
    pub skip: Option<u32>,
    pub take: Option<u32>,
}

/// Arguments of [`UsersRepository::get_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetUserArgs {
    pub filter: UserWhereUniqueInput,
}

/// Arguments of [`UsersRepository::update_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUserArgs {
    pub filter: UserWhereUniqueInput,
    pub data: UserUpdateInput,
}

/// Arguments of [`UsersRepository::delete_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteUserArgs {
    pub filter: UserWhereUniqueInput,
}

/// Data-access entry point for user records.
///
/// Holds the client handle for its whole lifetime; every method is one
/// client call whose result or error is returned unchanged.
pub struct UsersRepository<C: UserClient> {
    client: C,
}

impl<C: UserClient> UsersRepository<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Inserts a user and returns it with database-assigned fields.
    pub fn create_user(&self, args: CreateUserArgs) -> RepoResult<User> {
        let CreateUserArgs { data } = args;
        self.client.create(&data)
    }

    /// Lists users matching the filter, ordering and cursor.
    pub fn get_users(&self, args: GetUsersArgs) -> RepoResult<Vec<User>> {
        let GetUsersArgs {
            cursor,
            filter,
            order_by,
            skip,
            take,
        } = args;
        self.client.find_many(&UserListQuery {
            cursor,
            filter,
            order_by,
            skip,
            take,
        })
    }

    /// Gets one user; `Ok(None)` when nothing matches.
    pub fn get_user(&self, args: GetUserArgs) -> RepoResult<Option<User>> {
        self.client.find_unique(&args.filter)
    }

    /// Updates one user; `RepoError::NotFound` when nothing matches.
    pub fn update_user(&self, args: UpdateUserArgs) -> RepoResult<User> {
        let UpdateUserArgs { filter, data } = args;
        self.client.update(&filter, &data)
    }

    /// Deletes one user and returns its state before deletion.
    pub fn delete_user(&self, args: DeleteUserArgs) -> RepoResult<User> {
        self.client.delete(&args.filter)
    }
}
