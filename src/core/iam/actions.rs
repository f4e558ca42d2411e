//! Action names for IAM operations
//!
//! Statements refer to these (or to `iam:*`-style prefixes of them) in their
//! action lists.

// User actions
pub const USER_ACTION_CREATE_USER: &str = "iam:CreateUser";
pub const USER_ACTION_DELETE_USER: &str = "iam:DeleteUser";
pub const USER_ACTION_GET_USER: &str = "iam:GetUser";
pub const USER_ACTION_LIST_USERS: &str = "iam:ListUsers";
pub const USER_ACTION_UPDATE_USER: &str = "iam:UpdateUser";
pub const USER_ACTION_LIST_GROUPS_FOR_USER: &str = "iam:ListGroupsForUser";

// Group actions
pub const GROUP_ACTION_CREATE_GROUP: &str = "iam:CreateGroup";
pub const GROUP_ACTION_DELETE_GROUP: &str = "iam:DeleteGroup";
pub const GROUP_ACTION_GET_GROUP: &str = "iam:GetGroup";
pub const GROUP_ACTION_LIST_GROUPS: &str = "iam:ListGroups";
pub const GROUP_ACTION_UPDATE_GROUP: &str = "iam:UpdateGroup";
pub const GROUP_ACTION_LIST_MEMBERS: &str = "iam:ListMembers";
pub const GROUP_ACTION_ADD_MEMBER: &str = "iam:AddMember";
pub const GROUP_ACTION_REMOVE_MEMBER: &str = "iam:RemoveMember";
pub const GROUP_ACTION_ATTACH_GROUP_POLICY: &str = "iam:AttachGroupPolicy";
pub const GROUP_ACTION_DETACH_GROUP_POLICY: &str = "iam:DetachGroupPolicy";
pub const GROUP_ACTION_LIST_ATTACHED_GROUP_POLICIES: &str = "iam:ListAttachedGroupPolicies";

// Policy actions
pub const POLICY_ACTION_CREATE_POLICY: &str = "iam:CreatePolicy";
pub const POLICY_ACTION_DELETE_POLICY: &str = "iam:DeletePolicy";
pub const POLICY_ACTION_UPDATE_POLICY: &str = "iam:UpdatePolicy";
pub const POLICY_ACTION_GET_POLICY: &str = "iam:GetPolicy";
pub const POLICY_ACTION_LIST_ATTACHED_GROUPS: &str = "iam:ListAttachedGroups";
pub const POLICY_ACTION_LIST_POLICIES: &str = "iam:ListPolicies";

/// Every IAM action, in declaration order
pub const ALL_ACTIONS: &[&str] = &[
    USER_ACTION_CREATE_USER,
    USER_ACTION_DELETE_USER,
    USER_ACTION_GET_USER,
    USER_ACTION_LIST_USERS,
    USER_ACTION_UPDATE_USER,
    USER_ACTION_LIST_GROUPS_FOR_USER,
    GROUP_ACTION_CREATE_GROUP,
    GROUP_ACTION_DELETE_GROUP,
    GROUP_ACTION_GET_GROUP,
    GROUP_ACTION_LIST_GROUPS,
    GROUP_ACTION_UPDATE_GROUP,
    GROUP_ACTION_LIST_MEMBERS,
    GROUP_ACTION_ADD_MEMBER,
    GROUP_ACTION_REMOVE_MEMBER,
    GROUP_ACTION_ATTACH_GROUP_POLICY,
    GROUP_ACTION_DETACH_GROUP_POLICY,
    GROUP_ACTION_LIST_ATTACHED_GROUP_POLICIES,
    POLICY_ACTION_CREATE_POLICY,
    POLICY_ACTION_DELETE_POLICY,
    POLICY_ACTION_UPDATE_POLICY,
    POLICY_ACTION_GET_POLICY,
    POLICY_ACTION_LIST_ATTACHED_GROUPS,
    POLICY_ACTION_LIST_POLICIES,
];
